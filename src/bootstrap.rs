//! Bootstrap command resolution and user-data rendering.
//!
//! The bootstrap command can be provided inline or via a file path. It runs
//! once, as root, when the instance first boots. The command is embedded into
//! the user-data script verbatim; no quoting or escaping is applied.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;

const LINUX_SHEBANG: &str = "#!/bin/bash";

/// Errors raised while resolving the bootstrap command.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum BootstrapError {
    /// Raised when both inline and file sources are provided.
    #[error("bootstrap command cannot be provided both inline and via file")]
    BothProvided,
    /// Raised when neither source is provided.
    #[error("a bootstrap command is required")]
    Missing,
    /// Raised when an inline command is empty or only whitespace.
    #[error("bootstrap command must not be empty")]
    InlineEmpty,
    /// Raised when a file path is empty or only whitespace.
    #[error("bootstrap command file path must not be empty")]
    FilePathEmpty,
    /// Raised when a file resolves to empty or only whitespace.
    #[error("bootstrap command file must not be empty")]
    FileEmpty,
    /// Raised when reading the file source fails.
    #[error("failed to read bootstrap command file `{path}`: {message}")]
    FileRead {
        /// Expanded path that failed to read.
        path: String,
        /// Underlying error message.
        message: String,
    },
}

/// Resolves the bootstrap command from either an inline value or a file.
///
/// Inline and file sources are mutually exclusive and one of them is
/// required. Both are trimmed for emptiness checks, but the returned command
/// preserves the original content apart from trailing newlines.
///
/// # Errors
///
/// Returns [`BootstrapError`] when the inputs are invalid or the file cannot
/// be read.
pub fn resolve_bootstrap_command(
    inline: Option<&str>,
    file: Option<&str>,
) -> Result<String, BootstrapError> {
    match (inline, file) {
        (Some(_), Some(_)) => Err(BootstrapError::BothProvided),
        (None, None) => Err(BootstrapError::Missing),
        (Some(command), None) => {
            validate_command(command)?;
            Ok(command.to_owned())
        }
        (None, Some(path)) => read_command_file(path),
    }
}

fn read_command_file(path: &str) -> Result<String, BootstrapError> {
    if path.trim().is_empty() {
        return Err(BootstrapError::FilePathEmpty);
    }

    let expanded = expand_tilde(path);
    let content =
        read_to_string_ambient(&expanded).map_err(|message| BootstrapError::FileRead {
            path: expanded.clone(),
            message,
        })?;

    validate_command(&content).map_err(|err| match err {
        BootstrapError::InlineEmpty => BootstrapError::FileEmpty,
        other => other,
    })?;

    Ok(content.trim_end_matches(['\n', '\r']).to_owned())
}

/// Validates that a command is not empty or whitespace.
pub(crate) fn validate_command(command: &str) -> Result<(), BootstrapError> {
    if command.trim().is_empty() {
        return Err(BootstrapError::InlineEmpty);
    }
    Ok(())
}

/// Expands a leading `~/` using `HOME`.
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return format!("{}/{rest}", home.to_string_lossy());
    }
    path.to_owned()
}

/// Relative paths are anchored at the working directory so `../init.sh`
/// reaches a sibling of the project directory.
fn read_to_string_ambient(path: &str) -> Result<String, String> {
    let requested = Utf8Path::new(path);
    let absolute = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        let cwd = std::env::current_dir()
            .map_err(|err| format!("cannot resolve working directory: {err}"))?;
        Utf8PathBuf::from_path_buf(cwd)
            .map_err(|cwd| format!("working directory is not UTF-8: {}", cwd.display()))?
            .join(requested)
    };

    let parent = absolute
        .parent()
        .ok_or_else(|| format!("path has no parent directory: {absolute}"))?;
    let file_name = absolute
        .file_name()
        .ok_or_else(|| format!("path has no file name: {absolute}"))?;

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| err.to_string())?;
    dir.read_to_string(file_name).map_err(|err| err.to_string())
}

/// Shell script executed once at first boot of a Linux instance.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct UserData {
    commands: Vec<String>,
}

impl UserData {
    /// Starts an empty Linux user-data script.
    #[must_use]
    pub const fn for_linux() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Appends a raw command line.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    /// Renders the script: a bash shebang followed by one command per line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.commands.len() + 1);
        lines.push(LINUX_SHEBANG);
        lines.extend(self.commands.iter().map(String::as_str));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn inline_command_is_returned_verbatim() {
        let resolved = resolve_bootstrap_command(Some("yum install -y 'git'"), None);
        assert_eq!(resolved, Ok(String::from("yum install -y 'git'")));
    }

    #[test]
    fn rejects_both_sources() {
        let resolved = resolve_bootstrap_command(Some("true"), Some("/tmp/init.sh"));
        assert_eq!(resolved, Err(BootstrapError::BothProvided));
    }

    #[test]
    fn rejects_missing_sources() {
        assert_eq!(
            resolve_bootstrap_command(None, None),
            Err(BootstrapError::Missing)
        );
    }

    #[test]
    fn rejects_whitespace_inline_command() {
        assert_eq!(
            resolve_bootstrap_command(Some("  \n"), None),
            Err(BootstrapError::InlineEmpty)
        );
    }

    #[test]
    fn reads_command_file_and_strips_trailing_newline() {
        let dir = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let path = dir.path().join("init.sh");
        fs::write(&path, "echo hello > /tmp/hello\n").unwrap_or_else(|err| panic!("write: {err}"));
        let path_str = path.to_str().unwrap_or_else(|| panic!("utf8 path"));

        let resolved = resolve_bootstrap_command(None, Some(path_str));

        assert_eq!(resolved, Ok(String::from("echo hello > /tmp/hello")));
    }

    #[test]
    fn absolute_path_through_parent_component_is_read() {
        let dir = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        fs::create_dir(dir.path().join("proj")).unwrap_or_else(|err| panic!("mkdir: {err}"));
        fs::write(dir.path().join("init.sh"), "echo up\n")
            .unwrap_or_else(|err| panic!("write: {err}"));
        let path = dir.path().join("proj").join("..").join("init.sh");
        let path_str = path.to_str().unwrap_or_else(|| panic!("utf8 path"));

        assert_eq!(
            resolve_bootstrap_command(None, Some(path_str)),
            Ok(String::from("echo up"))
        );
    }

    #[test]
    fn empty_command_file_is_reported_as_file_empty() {
        let dir = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let path = dir.path().join("init.sh");
        fs::write(&path, "\n\n").unwrap_or_else(|err| panic!("write: {err}"));
        let path_str = path.to_str().unwrap_or_else(|| panic!("utf8 path"));

        assert_eq!(
            resolve_bootstrap_command(None, Some(path_str)),
            Err(BootstrapError::FileEmpty)
        );
    }

    #[test]
    fn missing_command_file_reports_path() {
        let err = resolve_bootstrap_command(None, Some("/nonexistent/spinup/init.sh"))
            .expect_err("missing file should fail");
        assert!(
            matches!(err, BootstrapError::FileRead { ref path, .. } if path == "/nonexistent/spinup/init.sh"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn user_data_renders_shebang_then_commands() {
        let script = UserData::for_linux()
            .with_command("yum update -y")
            .with_command("touch /var/tmp/ready")
            .render();
        assert_eq!(script, "#!/bin/bash\nyum update -y\ntouch /var/tmp/ready");
    }
}
