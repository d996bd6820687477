//! Behavioural smoke tests for the CLI entrypoint.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn cli_without_subcommand_prints_help_and_fails() {
    let mut cmd = cargo_bin_cmd!("spinup");
    cmd.assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("synth").and(predicate::str::contains("graph")));
}

#[test]
fn cli_help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("spinup");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Render the CloudFormation template"))
        .stdout(predicate::str::contains("Print the resource graph"));
}

#[test]
fn cli_rejects_both_bootstrap_flags() {
    let mut cmd = cargo_bin_cmd!("spinup");
    cmd.args([
        "synth",
        "--init-command",
        "echo hi",
        "--init-command-file",
        "init.sh",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
