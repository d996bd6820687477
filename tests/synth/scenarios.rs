//! BDD scenarios for `spinup synth`.

use rstest_bdd_macros::scenario;

use super::test_helpers::{CliContext, cli_context};

#[scenario(
    path = "tests/features/synth.feature",
    name = "Export the server address for an inline bootstrap command"
)]
fn scenario_synth_inline(cli_context: CliContext) {
    let _ = cli_context;
}

#[scenario(
    path = "tests/features/synth.feature",
    name = "Read the bootstrap command from a file"
)]
fn scenario_synth_file(cli_context: CliContext) {
    let _ = cli_context;
}

#[scenario(
    path = "tests/features/synth.feature",
    name = "Reject an empty bootstrap command"
)]
fn scenario_synth_empty_command(cli_context: CliContext) {
    let _ = cli_context;
}

#[scenario(
    path = "tests/features/synth.feature",
    name = "Reject a missing bootstrap command file"
)]
fn scenario_synth_missing_file(cli_context: CliContext) {
    let _ = cli_context;
}

#[scenario(
    path = "tests/features/synth.feature",
    name = "Write the template into an output directory"
)]
fn scenario_synth_out_dir(cli_context: CliContext) {
    let _ = cli_context;
}
