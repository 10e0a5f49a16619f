//! Unit tests for deployment configuration validation and path resolution.

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use stevedore::test_support::test_config;
use stevedore::{ConfigError, DeployConfig};

#[fixture]
fn valid_config() -> DeployConfig {
    DeployConfig {
        root_dir: String::from("/repo"),
        ..test_config()
    }
}

#[rstest]
fn validation_accepts_the_defaults(valid_config: DeployConfig) {
    assert!(valid_config.validate().is_ok());
}

#[rstest]
fn validation_rejects_a_blank_profile_with_actionable_guidance(valid_config: DeployConfig) {
    let config = DeployConfig {
        profile: String::from("  "),
        ..valid_config
    };

    let err = config.validate().expect_err("blank profile is invalid");
    let ConfigError::MissingField(ref message) = err else {
        panic!("expected MissingField, got {err:?}");
    };
    assert!(
        message.contains("STEVEDORE_PROFILE"),
        "error should mention env var: {message}"
    );
    assert!(
        message.contains("stevedore.toml"),
        "error should mention config file: {message}"
    );
}

#[rstest]
#[case::driver("driver")]
#[case::namespace("namespace")]
#[case::kubectl("kubectl_bin")]
fn validation_rejects_blank_required_fields(valid_config: DeployConfig, #[case] field: &str) {
    let mut config = valid_config;
    match field {
        "driver" => config.driver = String::new(),
        "namespace" => config.namespace = String::new(),
        _ => config.kubectl_bin = String::new(),
    }

    let err = config.validate().expect_err("blank field is invalid");
    assert!(matches!(err, ConfigError::MissingField(_)));
}

#[rstest]
fn validation_rejects_a_zero_rollout_timeout(valid_config: DeployConfig) {
    let config = DeployConfig {
        rollout_timeout_secs: 0,
        ..valid_config
    };

    assert_eq!(config.validate(), Err(ConfigError::InvalidTimeout));
}

#[rstest]
fn manifest_dir_resolves_against_the_repository_root(valid_config: DeployConfig) {
    assert_eq!(
        valid_config.manifest_dir_path(),
        Utf8PathBuf::from("/repo/infra/k8s")
    );
}

#[rstest]
fn absolute_manifest_dir_is_used_verbatim(valid_config: DeployConfig) {
    let config = DeployConfig {
        manifest_dir: String::from("/etc/manifests"),
        ..valid_config
    };

    assert_eq!(
        config.manifest_dir_path(),
        Utf8PathBuf::from("/etc/manifests")
    );
}

#[rstest]
fn rollout_timeout_renders_in_kubectl_form(valid_config: DeployConfig) {
    assert_eq!(valid_config.rollout_timeout_arg(), "180s");
}
