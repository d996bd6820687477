//! BDD step definitions for `spinup synth`.

use std::fmt;
use std::sync::Arc;

use camino::Utf8PathBuf;
use cap_std::{ambient_authority, fs_utf8::Dir};
use rstest_bdd_macros::{given, then, when};
use serde_json::Value;
use tempfile::TempDir;

use super::test_helpers::{CliContext, CliOutput};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
    #[error("failed to execute spinup command: {0}")]
    Execution(String),
    #[error("failed to prepare scenario files: {0}")]
    TempFile(String),
}

macro_rules! string_newtype {
    ($name:ident) => {
        #[derive(Clone, Debug, Eq, PartialEq)]
        struct $name(String);

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Ok(Self(value.to_owned()))
            }
        }
    };
}

string_newtype!(ProjectName);
string_newtype!(KeyPair);
string_newtype!(BootstrapCommand);
string_newtype!(FilePath);
string_newtype!(FileName);
string_newtype!(Description);
string_newtype!(Attribute);
string_newtype!(ErrorSnippet);

fn tmp_root(cli_context: &CliContext) -> Result<Utf8PathBuf, StepError> {
    let tmp_dir = cli_context
        .tmp_dir
        .as_ref()
        .ok_or_else(|| StepError::TempFile(String::from("scenario has no sandbox")))?;
    Utf8PathBuf::from_path_buf(tmp_dir.path().to_path_buf())
        .map_err(|path| StepError::TempFile(format!("non-utf8 path: {}", path.display())))
}

fn execute_synth(
    mut cli_context: CliContext,
    additional_args: &[&str],
) -> Result<CliContext, StepError> {
    let mut cmd = cli_context.base_command();
    cmd.arg("synth");
    cmd.args(additional_args);
    let output = cmd
        .output()
        .map_err(|err| StepError::Execution(err.to_string()))?;

    cli_context.output = Some(CliOutput::from_process_output(output));
    Ok(cli_context)
}

fn successful_output(cli_context: &CliContext) -> Result<&CliOutput, StepError> {
    let Some(output) = &cli_context.output else {
        return Err(StepError::Assertion(String::from("missing command output")));
    };
    if output.status_code != 0 {
        return Err(StepError::Assertion(format!(
            "expected success, got exit {} with stderr: {}",
            output.status_code, output.stderr
        )));
    }
    Ok(output)
}

fn template(cli_context: &CliContext) -> Result<Value, StepError> {
    let output = successful_output(cli_context)?;
    serde_json::from_str(&output.stdout)
        .map_err(|err| StepError::Assertion(format!("stdout is not a JSON template: {err}")))
}

#[given("a configured project \"{project}\" with key pair \"{key_pair}\"")]
fn configured_project(
    cli_context: CliContext,
    project: ProjectName,
    key_pair: KeyPair,
) -> Result<CliContext, StepError> {
    let tmp_dir = TempDir::new().map_err(|err| StepError::TempFile(err.to_string()))?;
    Ok(CliContext {
        project_name: project.to_string(),
        key_pair_name: key_pair.to_string(),
        tmp_dir: Some(Arc::new(tmp_dir)),
        ..cli_context
    })
}

#[when("I synthesise with inline bootstrap command \"{command}\"")]
fn synth_with_inline_command(
    cli_context: CliContext,
    command: BootstrapCommand,
) -> Result<CliContext, StepError> {
    execute_synth(cli_context, &["--init-command", command.as_ref()])
}

#[when("I synthesise with bootstrap command file containing \"{content}\"")]
fn synth_with_command_file(
    cli_context: CliContext,
    content: BootstrapCommand,
) -> Result<CliContext, StepError> {
    let root = tmp_root(&cli_context)?;
    Dir::open_ambient_dir(&root, ambient_authority())
        .and_then(|dir| dir.write("init.sh", content.as_ref()))
        .map_err(|err| StepError::TempFile(err.to_string()))?;
    let path = root.join("init.sh");

    execute_synth(cli_context, &["--init-command-file", path.as_str()])
}

#[when("I synthesise with missing bootstrap command file \"{path}\"")]
fn synth_with_missing_command_file(
    cli_context: CliContext,
    path: FilePath,
) -> Result<CliContext, StepError> {
    execute_synth(cli_context, &["--init-command-file", path.as_ref()])
}

#[when("I synthesise into an output directory with bootstrap command \"{command}\"")]
fn synth_into_out_dir(
    cli_context: CliContext,
    command: BootstrapCommand,
) -> Result<CliContext, StepError> {
    let out_dir = tmp_root(&cli_context)?.join("cdk.out");
    let mut context = execute_synth(
        cli_context,
        &[
            "--init-command",
            command.as_ref(),
            "--out-dir",
            out_dir.as_str(),
        ],
    )?;
    context.out_dir = Some(out_dir);
    Ok(context)
}

#[then("synthesis succeeds")]
fn synthesis_succeeds(cli_context: &CliContext) -> Result<(), StepError> {
    successful_output(cli_context).map(|_| ())
}

#[then("the template exports \"{description}\" from the instance \"{attribute}\"")]
fn template_exports(
    cli_context: &CliContext,
    description: Description,
    attribute: Attribute,
) -> Result<(), StepError> {
    let document = template(cli_context)?;
    let outputs = document
        .get("Outputs")
        .and_then(Value::as_object)
        .ok_or_else(|| StepError::Assertion(String::from("template has no outputs")))?;
    let matching = outputs.values().find(|output| {
        output.get("Description").and_then(Value::as_str) == Some(description.as_ref())
    });
    let Some(output) = matching else {
        return Err(StepError::Assertion(format!(
            "no output described as '{description}'"
        )));
    };

    let exported = output
        .pointer("/Value/Fn::GetAtt/1")
        .and_then(Value::as_str);
    if exported != Some(attribute.as_ref()) {
        return Err(StepError::Assertion(format!(
            "expected '{description}' to export {attribute}, got {output}"
        )));
    }
    Ok(())
}

#[then("the instance user data runs \"{command}\"")]
fn user_data_runs(cli_context: &CliContext, command: BootstrapCommand) -> Result<(), StepError> {
    let document = template(cli_context)?;
    let instance = document
        .get("Resources")
        .and_then(Value::as_object)
        .and_then(|resources| {
            resources.values().find(|resource| {
                resource.get("Type").and_then(Value::as_str) == Some("AWS::EC2::Instance")
            })
        })
        .ok_or_else(|| StepError::Assertion(String::from("template has no instance")))?;

    let script = instance
        .pointer("/Properties/UserData/Fn::Base64")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let expected = format!("#!/bin/bash\n{command}");
    if script != expected {
        return Err(StepError::Assertion(format!(
            "expected user data {expected:?}, got {script:?}"
        )));
    }
    Ok(())
}

#[then("synthesis fails with error containing \"{snippet}\"")]
fn synthesis_fails(cli_context: &CliContext, snippet: ErrorSnippet) -> Result<(), StepError> {
    let Some(output) = &cli_context.output else {
        return Err(StepError::Assertion(String::from("missing command output")));
    };
    if output.status_code == 0 {
        return Err(StepError::Assertion(String::from(
            "expected non-zero exit status",
        )));
    }
    if !output.stderr.contains(snippet.as_ref()) {
        return Err(StepError::Assertion(format!(
            "expected stderr to contain '{snippet}', got: {}",
            output.stderr
        )));
    }
    Ok(())
}

#[then("the output directory contains \"{file_name}\"")]
fn out_dir_contains(cli_context: &CliContext, file_name: FileName) -> Result<(), StepError> {
    let out_dir = cli_context
        .out_dir
        .as_ref()
        .ok_or_else(|| StepError::Assertion(String::from("no output directory requested")))?;
    let output = successful_output(cli_context)?;

    let expected_path = out_dir.join(file_name.as_ref());
    if output.stdout.trim_end() != expected_path.as_str() {
        return Err(StepError::Assertion(format!(
            "expected stdout to name {expected_path}, got: {}",
            output.stdout
        )));
    }

    let contents = Dir::open_ambient_dir(out_dir, ambient_authority())
        .and_then(|dir| dir.read_to_string(file_name.as_ref()))
        .map_err(|err| StepError::Assertion(format!("cannot read {expected_path}: {err}")))?;
    serde_json::from_str::<Value>(&contents)
        .map_err(|err| StepError::Assertion(format!("{expected_path} is not JSON: {err}")))?;
    Ok(())
}
