//! Binary entry point for the Stevedore CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;

use stevedore::{
    Catalog, DeployAction, DeployConfig, DeployError, DeployOptions, Orchestrator,
    StreamingCommandRunner,
};

mod cli;

use cli::Cli;

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("deployment failed: {0}")]
    Deploy(#[from] DeployError),
}

impl CliError {
    const fn exit_status(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Deploy(err) => err.exit_status(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            err.exit_status()
        }
    };

    process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config =
        DeployConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    let options = DeployOptions {
        no_cache: cli.no_cache,
        fresh: cli.fresh,
    };
    let orchestrator = Orchestrator::new(config, Catalog::standard(), options, StreamingCommandRunner)
        .map_err(|err| CliError::Config(err.to_string()))?;

    orchestrator.run(&resolve_action(cli))?;
    Ok(())
}

/// Maps CLI flags to a deployment action; teardown takes precedence.
fn resolve_action(cli: &Cli) -> DeployAction {
    if cli.teardown {
        return DeployAction::Teardown;
    }
    cli.service.as_ref().map_or(DeployAction::DeployAll, |name| {
        DeployAction::DeployOne(name.clone())
    })
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
