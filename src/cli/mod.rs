//! Command-line interface definitions for the `stevedore` binary.
//!
//! This module centralises the clap parser structure so both the main binary
//! and the build script can reuse it when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `stevedore` binary.
#[derive(Debug, Parser)]
#[command(
    name = "stevedore",
    about = "Deploy the auth and game services onto a local minikube cluster"
)]
pub(crate) struct Cli {
    /// Deploy only the named catalog service (`auth` or `game`).
    ///
    /// Names outside the catalog are warned and skipped rather than
    /// rejected. When omitted, every service deploys in catalog order and
    /// the shared ingress is applied afterwards.
    #[arg(long, value_name = "NAME")]
    pub(crate) service: Option<String>,
    /// Delete the minikube profile and all of its resources, then exit.
    ///
    /// Takes precedence over deployment when combined with other flags.
    #[arg(long)]
    pub(crate) teardown: bool,
    /// Rebuild container images without the build layer cache.
    #[arg(long)]
    pub(crate) no_cache: bool,
    /// Delete workloads before applying manifests, forcing a clean recreate
    /// instead of a rolling restart.
    #[arg(long)]
    pub(crate) fresh: bool,
}
