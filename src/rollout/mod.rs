//! Rollout readiness waiting with workload-kind fallback.
//!
//! A workload name may resolve to a deployment or a stateful set. The waiter
//! tries each kind in fixed priority order: a kind whose resource does not
//! exist moves to the next candidate, exhausting every candidate is a warned
//! non-fatal outcome, and an existing resource that never reaches readiness
//! is fatal. The last distinction is the load-bearing one — collapsing it
//! into "retry on any failure" would swallow real rollout failures.

use std::ffi::OsString;
use std::fmt;

use thiserror::Error;

use crate::config::DeployConfig;
use crate::report;
use crate::runner::{CommandError, CommandRunner};

/// Workload kinds tried by the waiter, in priority order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WorkloadKind {
    /// Stateless workload (`deployment`).
    Deployment,
    /// Stateful workload (`statefulset`).
    StatefulSet,
}

impl WorkloadKind {
    /// Returns the kubectl resource name for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deployment => "deployment",
            Self::StatefulSet => "statefulset",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default candidate order: stateless kinds before stateful ones.
pub const KIND_PRIORITY: [WorkloadKind; 2] = [WorkloadKind::Deployment, WorkloadKind::StatefulSet];

/// Terminal outcome of waiting on one workload name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RolloutOutcome {
    /// A resource of the given kind exists and reached readiness.
    Ready(WorkloadKind),
    /// No candidate kind resolved to an existing resource; the run continues.
    NoMatchingResource,
}

/// Errors raised while waiting for a rollout.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RolloutError {
    /// Raised when the wait command cannot be spawned.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// Raised when a resource exists but does not reach readiness in time.
    #[error("workload {kind}/{workload} did not become ready: {stderr}")]
    NotReady {
        /// Workload name being waited on.
        workload: String,
        /// Kind of the resource that failed.
        kind: WorkloadKind,
        /// Exit status of the wait command.
        status: Option<i32>,
        /// Stderr captured from the wait command.
        stderr: String,
    },
}

impl RolloutError {
    /// Returns the underlying command exit status when one exists.
    #[must_use]
    pub const fn status(&self) -> Option<i32> {
        match self {
            Self::Command(err) => err.status(),
            Self::NotReady { status, .. } => *status,
        }
    }
}

/// Blocks until a named workload reaches readiness, trying each candidate
/// kind in priority order.
#[derive(Clone, Debug)]
pub struct RolloutWaiter<R: CommandRunner> {
    runner: R,
    kubectl_bin: String,
    namespace: String,
    timeout_arg: String,
    kinds: Vec<WorkloadKind>,
}

impl<R: CommandRunner> RolloutWaiter<R> {
    /// Creates a waiter with the standard kind priority.
    #[must_use]
    pub fn new(config: &DeployConfig, runner: R) -> Self {
        Self {
            runner,
            kubectl_bin: config.kubectl_bin.clone(),
            namespace: config.namespace.clone(),
            timeout_arg: config.rollout_timeout_arg(),
            kinds: KIND_PRIORITY.to_vec(),
        }
    }

    /// Overrides the candidate kinds, primarily for tests.
    #[must_use]
    pub fn with_kinds(mut self, kinds: Vec<WorkloadKind>) -> Self {
        self.kinds = kinds;
        self
    }

    /// Waits for `workload` to reach readiness.
    ///
    /// # Errors
    ///
    /// Returns [`RolloutError::NotReady`] when a resource of some kind exists
    /// but fails to become ready within the timeout, and
    /// [`RolloutError::Command`] when the wait command cannot be spawned.
    pub fn wait(&self, workload: &str) -> Result<RolloutOutcome, RolloutError> {
        for kind in &self.kinds {
            let args = [
                OsString::from("rollout"),
                OsString::from("status"),
                OsString::from(format!("{kind}/{workload}")),
                OsString::from("-n"),
                OsString::from(&self.namespace),
                OsString::from(format!("--timeout={}", self.timeout_arg)),
            ];
            let output = self.runner.run(&self.kubectl_bin, &args)?;
            if output.is_success() {
                return Ok(RolloutOutcome::Ready(*kind));
            }
            if resource_missing(&output.stderr) {
                continue;
            }
            return Err(RolloutError::NotReady {
                workload: workload.to_owned(),
                kind: *kind,
                status: output.code,
                stderr: output.stderr.trim().to_owned(),
            });
        }

        report::warn(&format!(
            "no rollout resource found for {workload}, skipping wait"
        ));
        Ok(RolloutOutcome::NoMatchingResource)
    }
}

/// Classifies a failed wait: `kubectl` reports a missing resource as
/// `Error from server (NotFound): deployments.apps "<name>" not found`.
fn resource_missing(stderr: &str) -> bool {
    stderr.contains("NotFound") || stderr.contains("not found")
}
