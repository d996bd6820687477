//! Shared fixtures for synthesis behavioural tests.

use std::process::Output;
use std::sync::Arc;

use assert_cmd::cargo::cargo_bin_cmd;
use camino::Utf8PathBuf;
use rstest::fixture;
use tempfile::TempDir;

use crate::test_constants::{KEY_PAIR_NAME, PROJECT_NAME};

#[derive(Clone, Debug)]
pub struct CliOutput {
    pub status_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CliOutput {
    pub fn from_process_output(output: Output) -> Self {
        let Output {
            status,
            stdout: raw_stdout,
            stderr: raw_stderr,
        } = output;
        let status_code = status.code().unwrap_or(1);
        let stdout = String::from_utf8_lossy(&raw_stdout).into_owned();
        let stderr = String::from_utf8_lossy(&raw_stderr).into_owned();
        Self {
            status_code,
            stdout,
            stderr,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CliContext {
    pub project_name: String,
    pub key_pair_name: String,
    pub output: Option<CliOutput>,
    pub out_dir: Option<Utf8PathBuf>,
    pub tmp_dir: Option<Arc<TempDir>>,
}

impl CliContext {
    /// `spinup` with a scrubbed environment so only the scenario's settings
    /// apply.
    pub fn base_command(&self) -> assert_cmd::Command {
        let mut cmd = cargo_bin_cmd!("spinup");
        cmd.env_clear();
        if let Some(tmp_dir) = &self.tmp_dir {
            cmd.env("HOME", tmp_dir.path()).current_dir(tmp_dir.path());
        }
        cmd.env("SPINUP_PROJECT_NAME", &self.project_name);
        cmd.env("SPINUP_KEY_PAIR_NAME", &self.key_pair_name);
        cmd
    }
}

#[fixture]
pub fn cli_context() -> CliContext {
    CliContext {
        project_name: String::from(PROJECT_NAME),
        key_pair_name: String::from(KEY_PAIR_NAME),
        output: None,
        out_dir: None,
        tmp_dir: None,
    }
}
