//! Ordered application of declarative manifest documents.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::config::DeployConfig;
use crate::report;
use crate::runner::{CommandError, CommandRunner};

/// Applies manifest files to the cluster in declared order.
///
/// A manifest that does not exist on disk is skipped with a warning; the
/// declared ordering of the remaining files is preserved exactly.
#[derive(Clone, Debug)]
pub struct ManifestApplier<R: CommandRunner> {
    runner: R,
    kubectl_bin: String,
    manifest_dir: Utf8PathBuf,
}

impl<R: CommandRunner> ManifestApplier<R> {
    /// Creates an applier rooted at the configured manifest directory.
    #[must_use]
    pub fn new(config: &DeployConfig, runner: R) -> Self {
        Self {
            runner,
            kubectl_bin: config.kubectl_bin.clone(),
            manifest_dir: config.manifest_dir_path(),
        }
    }

    /// Applies each present manifest in order, returning how many were
    /// applied. Missing files, and a missing manifest directory, are warned
    /// and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when an apply command fails.
    pub fn apply(&self, manifests: &[&str]) -> Result<usize, CommandError> {
        let Ok(dir) = Dir::open_ambient_dir(&self.manifest_dir, ambient_authority()) else {
            report::warn(&format!(
                "manifest directory {} not found, skipping {} manifest(s)",
                self.manifest_dir,
                manifests.len()
            ));
            return Ok(0);
        };

        let mut applied = 0;
        for manifest in manifests {
            if dir.metadata(manifest).is_err() {
                report::warn(&format!(
                    "{} not found, skipping",
                    self.manifest_dir.join(manifest)
                ));
                continue;
            }
            let path = self.manifest_dir.join(manifest);
            let args = [
                OsString::from("apply"),
                OsString::from("-f"),
                OsString::from(path.as_str()),
            ];
            self.runner.run_checked(&self.kubectl_bin, &args)?;
            applied += 1;
        }
        Ok(applied)
    }

    /// Returns `true` when `manifest` exists in the manifest directory.
    #[must_use]
    pub fn manifest_exists(&self, manifest: &str) -> bool {
        Dir::open_ambient_dir(&self.manifest_dir, ambient_authority())
            .is_ok_and(|dir| dir.metadata(manifest).is_ok())
    }

    /// Returns the resolved path of `manifest` inside the manifest directory.
    #[must_use]
    pub fn manifest_path(&self, manifest: &str) -> Utf8PathBuf {
        self.manifest_dir.join(manifest)
    }
}
