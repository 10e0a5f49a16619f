//! Minikube profile lifecycle management.
//!
//! The manager brings a named profile to the running state, enables required
//! add-ons, and deletes the profile on teardown. Every operation is
//! idempotent: repeated calls against a converged cluster issue only probe
//! commands.

use std::collections::BTreeMap;
use std::ffi::OsString;

use serde::Deserialize;
use thiserror::Error;

use crate::config::DeployConfig;
use crate::report;
use crate::runner::{CommandError, CommandRunner};

/// Host status string reported by a running minikube profile.
const RUNNING_STATUS: &str = "Running";

/// Status assumed when the probe command exits non-zero.
const STOPPED_STATUS: &str = "Stopped";

/// Errors raised by cluster lifecycle operations.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ClusterError {
    /// Raised when an underlying command fails where success was required.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// Raised when the add-on listing cannot be parsed.
    #[error("failed to parse addon listing: {message}")]
    AddonParse {
        /// Parser error message.
        message: String,
    },
}

/// One entry of `minikube addons list -o json`.
#[derive(Debug, Deserialize)]
struct AddonEntry {
    #[serde(rename = "Status")]
    status: String,
}

/// Manages the lifecycle of a single minikube profile.
#[derive(Clone, Debug)]
pub struct ClusterManager<R: CommandRunner> {
    runner: R,
    minikube_bin: String,
    profile: String,
    driver: String,
}

impl<R: CommandRunner> ClusterManager<R> {
    /// Creates a manager bound to the configured profile.
    #[must_use]
    pub fn new(config: &DeployConfig, runner: R) -> Self {
        Self {
            runner,
            minikube_bin: config.minikube_bin.clone(),
            profile: config.profile.clone(),
            driver: config.driver.clone(),
        }
    }

    fn profile_arg(&self) -> OsString {
        OsString::from(format!("--profile={}", self.profile))
    }

    /// Ensures the profile exists and is running, starting it when the
    /// status probe reports anything other than `Running`.
    ///
    /// A non-zero probe exit is interpreted as a stopped cluster, not as an
    /// error; only spawn failures and a failing start command abort.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Command`] when the probe cannot be spawned or
    /// the start command fails.
    pub fn ensure_running(&self) -> Result<(), ClusterError> {
        let probe_args = [
            OsString::from("status"),
            OsString::from("--format={{.Host}}"),
            self.profile_arg(),
        ];
        let probe = self.runner.run(&self.minikube_bin, &probe_args)?;
        let status = if probe.is_success() {
            probe.stdout.trim().to_owned()
        } else {
            STOPPED_STATUS.to_owned()
        };

        if status == RUNNING_STATUS {
            report::note(&format!("minikube ({}) already running", self.profile));
            return Ok(());
        }

        report::note(&format!("starting minikube ({})", self.profile));
        let start_args = [
            OsString::from("start"),
            OsString::from(format!("--driver={}", self.driver)),
            self.profile_arg(),
        ];
        self.runner.run_checked(&self.minikube_bin, &start_args)?;
        Ok(())
    }

    /// Ensures every add-on in `addons` is enabled on the profile.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Command`] when listing or enabling fails and
    /// [`ClusterError::AddonParse`] when the listing is not valid JSON.
    pub fn ensure_addons(&self, addons: &[&str]) -> Result<(), ClusterError> {
        let list_args = [
            OsString::from("addons"),
            OsString::from("list"),
            OsString::from("-o"),
            OsString::from("json"),
            self.profile_arg(),
        ];
        let listing = self.runner.run_checked(&self.minikube_bin, &list_args)?;
        let table: BTreeMap<String, AddonEntry> =
            serde_json::from_str(&listing.stdout).map_err(|err| ClusterError::AddonParse {
                message: err.to_string(),
            })?;

        for addon in addons {
            let enabled = table
                .get(*addon)
                .is_some_and(|entry| entry.status.eq_ignore_ascii_case("enabled"));
            if enabled {
                continue;
            }
            report::note(&format!("enabling {addon} addon"));
            let enable_args = [
                OsString::from("addons"),
                OsString::from("enable"),
                OsString::from(*addon),
                self.profile_arg(),
            ];
            self.runner.run_checked(&self.minikube_bin, &enable_args)?;
        }
        Ok(())
    }

    /// Irreversibly deletes the profile and every resource in it.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Command`] when the delete command fails.
    pub fn teardown(&self) -> Result<(), ClusterError> {
        report::note(&format!("deleting minikube cluster ({})", self.profile));
        let args = [OsString::from("delete"), self.profile_arg()];
        self.runner.run_checked(&self.minikube_bin, &args)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
