//! Command-line interface definitions for the `spinup` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use camino::Utf8PathBuf;
use clap::{Args, Parser};

/// Top-level CLI for the `spinup` binary.
#[derive(Debug, Parser)]
#[command(
    name = "spinup",
    about = "Synthesise a single-server AWS stack into a CloudFormation template",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Render the CloudFormation template.
    #[command(name = "synth", about = "Render the CloudFormation template")]
    Synth(SynthCommand),
    /// Print the resource graph in registration order.
    #[command(name = "graph", about = "Print the resource graph in registration order")]
    Graph(GraphCommand),
}

/// Arguments for the `spinup synth` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct SynthCommand {
    /// Write `<stack>.template.json` into this directory instead of printing
    /// the template to stdout. The directory is created when missing.
    #[arg(long, value_name = "DIR")]
    pub(crate) out_dir: Option<Utf8PathBuf>,
    #[command(flatten)]
    pub(crate) overrides: StackOverrides,
}

/// Arguments for the `spinup graph` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct GraphCommand {
    #[command(flatten)]
    pub(crate) overrides: StackOverrides,
}

/// Per-invocation overrides of configured values.
#[derive(Debug, Default, Args)]
pub(crate) struct StackOverrides {
    /// Override the EC2 instance type (for example `t3.small`).
    #[arg(long, value_name = "TYPE")]
    pub(crate) instance_type: Option<String>,
    /// Provide the first-boot command inline.
    ///
    /// The command is embedded verbatim in the instance user data and runs
    /// once, as root, when the server first starts.
    #[arg(long, value_name = "COMMAND", conflicts_with = "init_command_file")]
    pub(crate) init_command: Option<String>,
    /// Read the first-boot command from a local file.
    #[arg(long, value_name = "PATH", conflicts_with = "init_command")]
    pub(crate) init_command_file: Option<String>,
}
