//! Container image building and loading.
//!
//! Images are rebuilt on every deploy; the build tool's own layer cache makes
//! an unchanged rebuild a cheap no-op, so no image diffing happens here.

use std::ffi::OsString;

use camino::Utf8Path;

use crate::config::DeployConfig;
use crate::runner::{CommandError, CommandRunner};

/// Builds a service image and loads it into the profile's image store.
#[derive(Clone, Debug)]
pub struct ImageLoader<R: CommandRunner> {
    runner: R,
    docker_bin: String,
    minikube_bin: String,
    profile: String,
}

impl<R: CommandRunner> ImageLoader<R> {
    /// Creates a loader bound to the configured tools and profile.
    #[must_use]
    pub fn new(config: &DeployConfig, runner: R) -> Self {
        Self {
            runner,
            docker_bin: config.docker_bin.clone(),
            minikube_bin: config.minikube_bin.clone(),
            profile: config.profile.clone(),
        }
    }

    /// Builds `image_tag` from `build_context`, then loads it into the
    /// cluster. The load only runs when the build succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when either step fails.
    pub fn build_and_load(
        &self,
        image_tag: &str,
        build_context: &Utf8Path,
        no_cache: bool,
    ) -> Result<(), CommandError> {
        let mut build_args = vec![
            OsString::from("build"),
            OsString::from("-t"),
            OsString::from(image_tag),
        ];
        if no_cache {
            build_args.push(OsString::from("--no-cache"));
        }
        build_args.push(OsString::from(build_context.as_str()));
        self.runner.run_checked(&self.docker_bin, &build_args)?;

        let load_args = [
            OsString::from("image"),
            OsString::from("load"),
            OsString::from(image_tag),
            OsString::from(format!("--profile={}", self.profile)),
        ];
        self.runner.run_checked(&self.minikube_bin, &load_args)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;

    use super::*;
    use crate::test_support::{ScriptedRunner, test_config};

    fn loader(runner: &ScriptedRunner) -> ImageLoader<ScriptedRunner> {
        ImageLoader::new(&test_config(), runner.clone())
    }

    #[test]
    fn build_precedes_load() {
        let runner = ScriptedRunner::new();
        runner.push_successes(2);
        loader(&runner)
            .build_and_load("auth-app:latest", Utf8PathBuf::from("svc").as_path(), false)
            .expect("build and load should succeed");

        assert_eq!(
            runner.command_strings(),
            [
                "docker build -t auth-app:latest svc",
                "minikube image load auth-app:latest --profile=mmo-cluster",
            ]
        );
    }

    #[test]
    fn no_cache_flag_is_forwarded_to_the_build() {
        let runner = ScriptedRunner::new();
        runner.push_successes(2);
        loader(&runner)
            .build_and_load("auth-app:latest", Utf8PathBuf::from("svc").as_path(), true)
            .expect("build and load should succeed");

        let commands = runner.command_strings();
        assert_eq!(
            commands.first().map(String::as_str),
            Some("docker build -t auth-app:latest --no-cache svc")
        );
    }

    #[test]
    fn build_failure_prevents_the_load_step() {
        let runner = ScriptedRunner::new();
        runner.push_failure(1, "build broke");
        let err = loader(&runner)
            .build_and_load("auth-app:latest", Utf8PathBuf::from("svc").as_path(), false)
            .expect_err("build failure should abort");

        assert!(matches!(err, CommandError::Failure { .. }));
        assert_eq!(runner.invocations().len(), 1, "load must not run");
    }
}
