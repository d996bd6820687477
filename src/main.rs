//! Binary entry point for the spinup CLI.

use std::io::{self, Write};
use std::process;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use spinup::{ConfigError, StackConfig, SynthError, render_json, synthesize, write_template};

mod cli;

use clap::Parser;
use cli::{Cli, GraphCommand, StackOverrides, SynthCommand};

/// Environment variable holding the log filter directives.
const LOG_ENV_VAR: &str = "SPINUP_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("synthesis failed: {0}")]
    Synth(#[from] SynthError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli, &mut io::stdout()) {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

/// Logs go to stderr so stdout carries only the template.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

fn dispatch(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    match cli {
        Cli::Synth(command) => synth(command, out),
        Cli::Graph(command) => graph(command, out),
    }
}

fn synth(args: SynthCommand, out: &mut impl Write) -> Result<(), CliError> {
    let config = load_config(args.overrides)?;
    let settings = config.as_settings()?;
    let synthesis = synthesize(&settings)?;

    if let Some(out_dir) = args.out_dir {
        let path = write_template(&out_dir, settings.stack_name(), &synthesis.template)?;
        writeln!(out, "{path}")?;
    } else {
        out.write_all(render_json(&synthesis.template)?.as_bytes())?;
    }
    Ok(())
}

fn graph(args: GraphCommand, out: &mut impl Write) -> Result<(), CliError> {
    let config = load_config(args.overrides)?;
    let settings = config.as_settings()?;
    let synthesis = synthesize(&settings)?;

    writeln!(out, "stack {}", synthesis.graph.stack_name())?;
    for resource in &synthesis.graph {
        writeln!(out, "{resource}")?;
    }
    Ok(())
}

fn load_config(overrides: StackOverrides) -> Result<StackConfig, CliError> {
    let config = StackConfig::load_without_cli_args()?;
    Ok(apply_overrides(config, overrides))
}

/// Command-line values win over configured ones. Either bootstrap flag
/// replaces both configured bootstrap sources.
fn apply_overrides(config: StackConfig, overrides: StackOverrides) -> StackConfig {
    let StackOverrides {
        instance_type,
        init_command,
        init_command_file,
    } = overrides;

    let bootstrap_overridden = init_command.is_some() || init_command_file.is_some();
    StackConfig {
        instance_type: instance_type.unwrap_or(config.instance_type),
        server_init_command: if bootstrap_overridden {
            init_command
        } else {
            config.server_init_command
        },
        server_init_command_file: if bootstrap_overridden {
            init_command_file
        } else {
            config.server_init_command_file
        },
        ..config
    }
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StackConfig {
        StackConfig {
            project_name: String::from("demo"),
            key_pair_name: String::from("demo-key"),
            server_init_command: None,
            server_init_command_file: Some(String::from("~/init.sh")),
            stack_name: String::from("SpinUpServerStack"),
            vpc_cidr: String::from("10.0.0.0/16"),
            subnet_cidr_mask: 24,
            max_azs: 2,
            instance_type: String::from("t3.micro"),
            machine_image: String::from("amazon-linux-2"),
        }
    }

    #[test]
    fn overrides_absent_keep_configured_values() {
        let merged = apply_overrides(config(), StackOverrides::default());
        assert_eq!(merged, config());
    }

    #[test]
    fn inline_override_replaces_configured_file() {
        let merged = apply_overrides(
            config(),
            StackOverrides {
                instance_type: Some(String::from("t3.small")),
                init_command: Some(String::from("echo hi")),
                init_command_file: None,
            },
        );

        assert_eq!(merged.instance_type, "t3.small");
        assert_eq!(merged.server_init_command.as_deref(), Some("echo hi"));
        assert_eq!(merged.server_init_command_file, None);
    }

    #[test]
    fn write_error_writes_cli_error() {
        let mut buf = Vec::new();
        let err = CliError::Config(ConfigError::MissingField(String::from(
            "missing project name",
        )));
        write_error(&mut buf, &err);
        let rendered = String::from_utf8(buf).unwrap_or_else(|err| panic!("utf8: {err}"));
        assert_eq!(
            rendered,
            "configuration error: missing configuration field: missing project name\n"
        );
    }
}
