//! Deployment configuration loaded via `ortho-config`.
//!
//! All paths and tool locations are explicit configuration; no component
//! reads ambient global state such as the process working directory beyond
//! the configured `root_dir`.

use std::ffi::OsString;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Default minikube profile name targeted by all operations.
pub const DEFAULT_PROFILE: &str = "mmo-cluster";

/// Default directory containing the declarative manifests, relative to
/// `root_dir`.
pub const DEFAULT_MANIFEST_DIR: &str = "infra/k8s";

/// Default rollout wait timeout in seconds.
pub const DEFAULT_ROLLOUT_TIMEOUT_SECS: u64 = 180;

/// Deployment settings merged from defaults, `stevedore.toml`, and
/// `STEVEDORE_*` environment variables.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "STEVEDORE",
    discovery(
        app_name = "stevedore",
        env_var = "STEVEDORE_CONFIG_PATH",
        config_file_name = "stevedore.toml",
        dotfile_name = ".stevedore.toml",
        project_file_name = "stevedore.toml"
    )
)]
pub struct DeployConfig {
    /// Minikube profile name; all operations in a run target this profile.
    #[ortho_config(default = DEFAULT_PROFILE.to_owned())]
    pub profile: String,
    /// Minikube VM driver used when the cluster must be started.
    #[ortho_config(default = "docker".to_owned())]
    pub driver: String,
    /// Kubernetes namespace scoping workload operations.
    #[ortho_config(default = "default".to_owned())]
    pub namespace: String,
    /// Repository root against which service build directories and the
    /// manifest directory are resolved.
    #[ortho_config(default = ".".to_owned())]
    pub root_dir: String,
    /// Directory containing manifest documents, relative to `root_dir`
    /// unless absolute.
    #[ortho_config(default = DEFAULT_MANIFEST_DIR.to_owned())]
    pub manifest_dir: String,
    /// Path to the `docker` executable.
    #[ortho_config(default = "docker".to_owned())]
    pub docker_bin: String,
    /// Path to the `minikube` executable.
    #[ortho_config(default = "minikube".to_owned())]
    pub minikube_bin: String,
    /// Path to the `kubectl` executable.
    #[ortho_config(default = "kubectl".to_owned())]
    pub kubectl_bin: String,
    /// Seconds to wait for a workload rollout before treating an existing
    /// resource as failed.
    #[ortho_config(default = DEFAULT_ROLLOUT_TIMEOUT_SECS)]
    pub rollout_timeout_secs: u64,
}

/// Metadata for a configuration field, used to generate actionable error
/// messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(
        description: &'static str,
        env_var: &'static str,
        toml_key: &'static str,
    ) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl DeployConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to stevedore.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("stevedore")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields. Error messages name
    /// the environment variable and TOML key that supply the missing value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is blank
    /// and [`ConfigError::InvalidTimeout`] when the rollout timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.profile,
            &FieldMetadata::new("minikube profile", "STEVEDORE_PROFILE", "profile"),
        )?;
        Self::require_field(
            &self.driver,
            &FieldMetadata::new("cluster driver", "STEVEDORE_DRIVER", "driver"),
        )?;
        Self::require_field(
            &self.namespace,
            &FieldMetadata::new("namespace", "STEVEDORE_NAMESPACE", "namespace"),
        )?;
        Self::require_field(
            &self.root_dir,
            &FieldMetadata::new("repository root", "STEVEDORE_ROOT_DIR", "root_dir"),
        )?;
        Self::require_field(
            &self.manifest_dir,
            &FieldMetadata::new("manifest directory", "STEVEDORE_MANIFEST_DIR", "manifest_dir"),
        )?;
        Self::require_field(
            &self.docker_bin,
            &FieldMetadata::new("docker binary", "STEVEDORE_DOCKER_BIN", "docker_bin"),
        )?;
        Self::require_field(
            &self.minikube_bin,
            &FieldMetadata::new("minikube binary", "STEVEDORE_MINIKUBE_BIN", "minikube_bin"),
        )?;
        Self::require_field(
            &self.kubectl_bin,
            &FieldMetadata::new("kubectl binary", "STEVEDORE_KUBECTL_BIN", "kubectl_bin"),
        )?;
        if self.rollout_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    /// Returns the configured repository root as a UTF-8 path.
    #[must_use]
    pub fn root_dir_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(&self.root_dir)
    }

    /// Resolves the manifest directory against `root_dir` unless it is
    /// already absolute.
    #[must_use]
    pub fn manifest_dir_path(&self) -> Utf8PathBuf {
        let manifest_dir = Utf8Path::new(&self.manifest_dir);
        if manifest_dir.is_absolute() {
            manifest_dir.to_path_buf()
        } else {
            self.root_dir_path().join(manifest_dir)
        }
    }

    /// Renders the rollout timeout in the form `kubectl` expects.
    #[must_use]
    pub fn rollout_timeout_arg(&self) -> String {
        format!("{}s", self.rollout_timeout_secs)
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates the rollout timeout is zero.
    #[error("rollout_timeout_secs must be greater than zero")]
    InvalidTimeout,
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}
