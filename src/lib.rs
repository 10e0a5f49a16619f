//! Core library for the Stevedore deployment orchestrator.
//!
//! The crate brings a local minikube cluster from an arbitrary starting
//! state to "all declared services running and routable": ensure the profile
//! is running with its required add-ons, build and load each service image,
//! apply manifests in declared order, wait for every workload's rollout, and
//! apply the shared ingress. Teardown deletes the profile outright. All
//! external tooling is driven through the [`runner::CommandRunner`]
//! abstraction so the sequencing logic is testable without a cluster.

pub mod catalog;
pub mod cluster;
pub mod config;
pub mod deploy;
pub mod image;
pub mod ingress;
pub mod manifest;
mod report;
pub mod rollout;
pub mod runner;
pub mod test_support;

pub use catalog::{Catalog, ServiceDescriptor};
pub use cluster::{ClusterError, ClusterManager};
pub use config::{ConfigError, DeployConfig};
pub use deploy::{
    DeployAction, DeployError, DeployOptions, DeployOutcome, Orchestrator, REQUIRED_ADDONS,
    ServiceDeployer,
};
pub use image::ImageLoader;
pub use ingress::{INGRESS_MANIFEST, IngressManager, PORT_FORWARD_HINT};
pub use manifest::ManifestApplier;
pub use rollout::{KIND_PRIORITY, RolloutError, RolloutOutcome, RolloutWaiter, WorkloadKind};
pub use runner::{
    CommandError, CommandOutput, CommandRunner, ProcessCommandRunner, StreamingCommandRunner,
};
