//! Unit tests for cluster lifecycle management.

use rstest::{fixture, rstest};

use super::*;
use crate::test_support::{ScriptedRunner, json_addons, test_config};

fn manager(runner: &ScriptedRunner) -> ClusterManager<ScriptedRunner> {
    ClusterManager::new(&test_config(), runner.clone())
}

#[fixture]
fn runner() -> ScriptedRunner {
    ScriptedRunner::new()
}

#[rstest]
fn ensure_running_is_a_no_op_when_already_running(runner: ScriptedRunner) {
    runner.push_output(Some(0), "Running\n", "");
    manager(&runner)
        .ensure_running()
        .expect("running cluster should be accepted");

    assert_eq!(
        runner.command_strings(),
        ["minikube status --format={{.Host}} --profile=mmo-cluster"]
    );
}

#[rstest]
fn ensure_running_starts_a_stopped_cluster(runner: ScriptedRunner) {
    runner.push_output(Some(0), "Stopped\n", "");
    runner.push_success();
    manager(&runner)
        .ensure_running()
        .expect("start should succeed");

    assert_eq!(
        runner.command_strings(),
        [
            "minikube status --format={{.Host}} --profile=mmo-cluster",
            "minikube start --driver=docker --profile=mmo-cluster",
        ]
    );
}

#[rstest]
fn non_zero_probe_is_treated_as_stopped(runner: ScriptedRunner) {
    runner.push_failure(85, "profile not found");
    runner.push_success();
    manager(&runner)
        .ensure_running()
        .expect("failed probe should trigger a start, not an error");

    let commands = runner.command_strings();
    assert_eq!(commands.len(), 2);
    assert!(
        commands
            .last()
            .is_some_and(|command| command.starts_with("minikube start")),
        "expected a start command, got {commands:?}"
    );
}

#[rstest]
fn start_failure_is_fatal(runner: ScriptedRunner) {
    runner.push_failure(1, "probe failed");
    runner.push_failure(78, "insufficient memory");
    let err = manager(&runner)
        .ensure_running()
        .expect_err("start failure should abort");

    let ClusterError::Command(CommandError::Failure { status, .. }) = err else {
        panic!("expected command failure, got {err:?}");
    };
    assert_eq!(status, Some(78));
}

#[rstest]
fn ensure_addons_skips_already_enabled_addons(runner: ScriptedRunner) {
    runner.push_output(Some(0), json_addons(&[("ingress", "enabled")]), "");
    manager(&runner)
        .ensure_addons(&["ingress"])
        .expect("enabled addon needs no action");

    assert_eq!(
        runner.command_strings(),
        ["minikube addons list -o json --profile=mmo-cluster"]
    );
}

#[rstest]
fn ensure_addons_enables_missing_addons(runner: ScriptedRunner) {
    runner.push_output(Some(0), json_addons(&[("ingress", "disabled")]), "");
    runner.push_success();
    manager(&runner)
        .ensure_addons(&["ingress"])
        .expect("enable should succeed");

    assert_eq!(
        runner.command_strings(),
        [
            "minikube addons list -o json --profile=mmo-cluster",
            "minikube addons enable ingress --profile=mmo-cluster",
        ]
    );
}

#[rstest]
fn ensure_addons_enables_addons_absent_from_the_listing(runner: ScriptedRunner) {
    runner.push_output(Some(0), json_addons(&[("metrics-server", "enabled")]), "");
    runner.push_success();
    manager(&runner)
        .ensure_addons(&["ingress"])
        .expect("unlisted addon should be enabled");

    assert_eq!(runner.invocations().len(), 2);
}

#[rstest]
fn ensure_addons_rejects_malformed_listing(runner: ScriptedRunner) {
    runner.push_output(Some(0), "ingress: enabled", "");
    let err = manager(&runner)
        .ensure_addons(&["ingress"])
        .expect_err("non-JSON listing should fail");

    assert!(matches!(err, ClusterError::AddonParse { .. }));
}

#[rstest]
fn teardown_deletes_the_profile(runner: ScriptedRunner) {
    runner.push_success();
    manager(&runner).teardown().expect("delete should succeed");

    assert_eq!(
        runner.command_strings(),
        ["minikube delete --profile=mmo-cluster"]
    );
}
