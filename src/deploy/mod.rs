//! Deployment orchestration.
//!
//! The orchestrator resolves a [`DeployAction`] and drives the lifecycle,
//! image, manifest, rollout, and ingress components in a single linear
//! sequence of blocking steps. The first fatal failure aborts the remaining
//! sequence; completed steps are not rolled back, and re-invoking after a
//! failure is safe because every step is idempotent.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::catalog::{Catalog, ServiceDescriptor};
use crate::cluster::{ClusterError, ClusterManager};
use crate::config::{ConfigError, DeployConfig};
use crate::image::ImageLoader;
use crate::ingress::IngressManager;
use crate::manifest::ManifestApplier;
use crate::report;
use crate::rollout::{RolloutError, RolloutWaiter};
use crate::runner::{CommandError, CommandRunner};

/// Add-ons required on the profile before any service deploys.
pub const REQUIRED_ADDONS: &[&str] = &["ingress"];

/// Action resolved from CLI input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeployAction {
    /// Deploy every catalog service in declared order, then apply ingress.
    DeployAll,
    /// Deploy a single catalog service; no ingress step.
    DeployOne(String),
    /// Delete the cluster profile and everything in it.
    Teardown,
}

/// Per-run deployment toggles.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DeployOptions {
    /// Disable the image build layer cache.
    pub no_cache: bool,
    /// Delete workloads before applying manifests, forcing a clean recreate.
    pub fresh: bool,
}

/// Outcome of deploying one named service.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeployOutcome {
    /// The service deployed and every existing workload reached readiness.
    Deployed,
    /// The name was not in the catalog; nothing was done.
    UnknownService,
}

/// Errors surfaced while performing a deployment run.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DeployError {
    /// Raised when cluster start or add-on enablement fails.
    #[error("cluster lifecycle failed: {0}")]
    Cluster(#[from] ClusterError),
    /// Raised when building or loading a service image fails.
    #[error("image build or load failed for service '{service}': {source}")]
    Image {
        /// Service being deployed.
        service: String,
        /// Underlying command failure.
        #[source]
        source: CommandError,
    },
    /// Raised when deleting workloads for a fresh recreate fails.
    #[error("workload recreate failed for service '{service}': {source}")]
    Recreate {
        /// Service being deployed.
        service: String,
        /// Underlying command failure.
        #[source]
        source: CommandError,
    },
    /// Raised when applying a service's manifests fails.
    #[error("manifest apply failed for service '{service}': {source}")]
    Manifest {
        /// Service being deployed.
        service: String,
        /// Underlying command failure.
        #[source]
        source: CommandError,
    },
    /// Raised when a workload exists but never reaches readiness.
    #[error("rollout failed for service '{service}': {source}")]
    Rollout {
        /// Service being deployed.
        service: String,
        /// Underlying rollout failure.
        #[source]
        source: RolloutError,
    },
    /// Raised when the shared ingress manifest fails to apply.
    #[error("ingress apply failed: {0}")]
    Ingress(#[source] CommandError),
    /// Raised when profile deletion fails.
    #[error("cluster teardown failed: {0}")]
    Teardown(#[source] ClusterError),
}

impl DeployError {
    /// Returns the exit status of the failing command, defaulting to 1 when
    /// the underlying failure carries none.
    #[must_use]
    pub const fn exit_status(&self) -> i32 {
        let status = match self {
            Self::Cluster(ClusterError::Command(err))
            | Self::Teardown(ClusterError::Command(err))
            | Self::Image { source: err, .. }
            | Self::Recreate { source: err, .. }
            | Self::Manifest { source: err, .. }
            | Self::Ingress(err) => err.status(),
            Self::Rollout { source, .. } => source.status(),
            Self::Cluster(ClusterError::AddonParse { .. })
            | Self::Teardown(ClusterError::AddonParse { .. }) => None,
        };
        match status {
            Some(code) => code,
            None => 1,
        }
    }
}

/// Deploys one named service: build and load the image, optionally recreate
/// workloads, apply manifests in order, then wait for every workload.
#[derive(Clone, Debug)]
pub struct ServiceDeployer<'a, R: CommandRunner + Clone> {
    catalog: &'a Catalog,
    images: ImageLoader<R>,
    manifests: ManifestApplier<R>,
    rollouts: RolloutWaiter<R>,
    runner: R,
    kubectl_bin: String,
    namespace: String,
    root_dir: Utf8PathBuf,
    options: DeployOptions,
}

impl<'a, R: CommandRunner + Clone> ServiceDeployer<'a, R> {
    /// Creates a deployer over the given catalog.
    #[must_use]
    pub fn new(
        config: &DeployConfig,
        catalog: &'a Catalog,
        options: DeployOptions,
        runner: R,
    ) -> Self {
        Self {
            catalog,
            images: ImageLoader::new(config, runner.clone()),
            manifests: ManifestApplier::new(config, runner.clone()),
            rollouts: RolloutWaiter::new(config, runner.clone()),
            runner,
            kubectl_bin: config.kubectl_bin.clone(),
            namespace: config.namespace.clone(),
            root_dir: config.root_dir_path(),
            options,
        }
    }

    /// Deploys the named service. An unknown name is warned and skipped;
    /// no build, apply, or wait commands are issued for it.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError`] when any required step fails.
    pub fn deploy(&self, name: &str) -> Result<DeployOutcome, DeployError> {
        let Some(service) = self.catalog.get(name) else {
            report::warn(&format!("unknown service '{name}', skipping"));
            return Ok(DeployOutcome::UnknownService);
        };

        report::note(&format!("=== Deploying {name} ==="));
        let build_context = self.root_dir.join(service.build_dir);
        self.images
            .build_and_load(service.image_tag, &build_context, self.options.no_cache)
            .map_err(|source| DeployError::Image {
                service: name.to_owned(),
                source,
            })?;

        if self.options.fresh {
            self.delete_workloads(service)?;
        }

        self.manifests
            .apply(service.manifests)
            .map_err(|source| DeployError::Manifest {
                service: name.to_owned(),
                source,
            })?;

        for workload in service.workloads {
            self.rollouts
                .wait(workload)
                .map_err(|source| DeployError::Rollout {
                    service: name.to_owned(),
                    source,
                })?;
        }

        report::note(&format!("{name} deployed successfully"));
        Ok(DeployOutcome::Deployed)
    }

    /// Deletes the service's workloads ahead of a fresh recreate. Resources
    /// that do not exist are ignored by the delete command itself.
    fn delete_workloads(&self, service: &ServiceDescriptor) -> Result<(), DeployError> {
        for workload in service.workloads {
            report::note(&format!("deleting workload {workload}"));
            let args = [
                OsString::from("delete"),
                OsString::from("deployment"),
                OsString::from(*workload),
                OsString::from("-n"),
                OsString::from(&self.namespace),
                OsString::from("--ignore-not-found"),
            ];
            self.runner
                .run_checked(&self.kubectl_bin, &args)
                .map_err(|source| DeployError::Recreate {
                    service: service.name.to_owned(),
                    source,
                })?;
        }
        Ok(())
    }
}

/// Entry point composing the full deployment sequence.
#[derive(Clone, Debug)]
pub struct Orchestrator<R: CommandRunner + Clone> {
    config: DeployConfig,
    catalog: Catalog,
    options: DeployOptions,
    runner: R,
}

impl<R: CommandRunner + Clone> Orchestrator<R> {
    /// Creates an orchestrator after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation.
    pub fn new(
        config: DeployConfig,
        catalog: Catalog,
        options: DeployOptions,
        runner: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            catalog,
            options,
            runner,
        })
    }

    /// Runs the resolved action to completion.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError`] from the first fatal step.
    pub fn run(&self, action: &DeployAction) -> Result<(), DeployError> {
        match action {
            DeployAction::Teardown => self.cluster().teardown().map_err(DeployError::Teardown),
            DeployAction::DeployOne(name) => {
                self.prepare_cluster()?;
                self.deployer().deploy(name)?;
                Ok(())
            }
            DeployAction::DeployAll => {
                self.prepare_cluster()?;
                let deployer = self.deployer();
                for service in self.catalog.services() {
                    deployer.deploy(service.name)?;
                }
                IngressManager::new(&self.config, self.runner.clone())
                    .apply()
                    .map_err(DeployError::Ingress)
            }
        }
    }

    fn prepare_cluster(&self) -> Result<(), DeployError> {
        let cluster = self.cluster();
        cluster.ensure_running()?;
        cluster.ensure_addons(REQUIRED_ADDONS)?;
        Ok(())
    }

    fn cluster(&self) -> ClusterManager<R> {
        ClusterManager::new(&self.config, self.runner.clone())
    }

    fn deployer(&self) -> ServiceDeployer<'_, R> {
        ServiceDeployer::new(&self.config, &self.catalog, self.options, self.runner.clone())
    }
}
