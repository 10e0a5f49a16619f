//! Shared ingress application.
//!
//! The ingress manifest is applied once per deploy-all run, after every
//! service has completed its rollout wait, through the profile's own
//! `minikube kubectl` access path.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::config::DeployConfig;
use crate::report;
use crate::runner::{CommandError, CommandRunner};

/// Filename of the shared ingress manifest.
pub const INGRESS_MANIFEST: &str = "ingress.yaml";

/// Port-forward command suggested to the operator after the ingress applies.
pub const PORT_FORWARD_HINT: &str =
    "kubectl port-forward --namespace ingress-nginx svc/ingress-nginx-controller 8080:80 8443:443";

/// Applies the shared ingress manifest through the cluster profile.
#[derive(Clone, Debug)]
pub struct IngressManager<R: CommandRunner> {
    runner: R,
    minikube_bin: String,
    profile: String,
    manifest_dir: Utf8PathBuf,
}

impl<R: CommandRunner> IngressManager<R> {
    /// Creates a manager bound to the configured profile and manifest
    /// directory.
    #[must_use]
    pub fn new(config: &DeployConfig, runner: R) -> Self {
        Self {
            runner,
            minikube_bin: config.minikube_bin.clone(),
            profile: config.profile.clone(),
            manifest_dir: config.manifest_dir_path(),
        }
    }

    /// Applies `ingress.yaml` when present, then prints the port-forward
    /// hint. A missing manifest is warned and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the apply command fails.
    pub fn apply(&self) -> Result<(), CommandError> {
        let exists = Dir::open_ambient_dir(&self.manifest_dir, ambient_authority())
            .is_ok_and(|dir| dir.metadata(INGRESS_MANIFEST).is_ok());
        if !exists {
            report::warn(&format!(
                "no {} found at {}, skipping ingress",
                INGRESS_MANIFEST, self.manifest_dir
            ));
            return Ok(());
        }

        let path = self.manifest_dir.join(INGRESS_MANIFEST);
        let args = [
            OsString::from("kubectl"),
            OsString::from("--profile"),
            OsString::from(&self.profile),
            OsString::from("--"),
            OsString::from("apply"),
            OsString::from("-f"),
            OsString::from(path.as_str()),
        ];
        self.runner.run_checked(&self.minikube_bin, &args)?;
        report::note(&format!(
            "ingress applied; run '{PORT_FORWARD_HINT}' to reach services on localhost"
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, write};

    use camino::{Utf8Path, Utf8PathBuf};
    use tempfile::TempDir;

    use super::*;
    use crate::test_support::{ScriptedRunner, test_config};

    fn config_with_root(root: &Utf8Path) -> DeployConfig {
        DeployConfig {
            root_dir: root.to_string(),
            ..test_config()
        }
    }

    #[test]
    fn applies_ingress_through_the_profile() {
        let tmp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
        let manifest_dir = root.join("infra/k8s");
        create_dir_all(&manifest_dir).expect("create manifest dir");
        write(manifest_dir.join(INGRESS_MANIFEST), "kind: Ingress").expect("write ingress");

        let runner = ScriptedRunner::new();
        runner.push_success();
        IngressManager::new(&config_with_root(&root), runner.clone())
            .apply()
            .expect("apply should succeed");

        assert_eq!(
            runner.command_strings(),
            [format!(
                "minikube kubectl --profile mmo-cluster -- apply -f {}",
                manifest_dir.join(INGRESS_MANIFEST)
            )]
        );
    }

    #[test]
    fn missing_ingress_manifest_is_skipped() {
        let tmp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
        create_dir_all(root.join("infra/k8s")).expect("create manifest dir");

        let runner = ScriptedRunner::new();
        IngressManager::new(&config_with_root(&root), runner.clone())
            .apply()
            .expect("missing manifest must not abort");

        assert!(runner.invocations().is_empty());
    }
}
