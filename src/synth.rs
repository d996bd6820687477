//! Synthesis: turning settings into a template and writing it out.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;
use tracing::info;

use crate::stack::{self, ResourceGraph, StackError, StackSettings};
use crate::template::{self, Template, TemplateError};

/// Suffix of written template files.
pub const TEMPLATE_FILE_SUFFIX: &str = ".template.json";

/// Errors raised during synthesis.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Raised when the stack definition cannot be assembled.
    #[error(transparent)]
    Stack(#[from] StackError),
    /// Raised when rendering fails.
    #[error("template rendering failed: {0}")]
    Template(#[from] TemplateError),
    /// Raised when JSON serialisation fails.
    #[error("failed to serialise template: {0}")]
    Serialise(#[from] serde_json::Error),
    /// Raised when file system operations fail.
    #[error("failed to write {path}: {message}")]
    Io {
        /// Path that could not be written.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
}

/// Result of a synthesis pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Synthesis {
    /// Descriptors as registered.
    pub graph: ResourceGraph,
    /// Rendered template.
    pub template: Template,
}

/// Builds the stack into a fresh graph and renders it.
///
/// # Errors
///
/// Returns [`SynthError::Stack`] or [`SynthError::Template`].
pub fn synthesize(settings: &StackSettings) -> Result<Synthesis, SynthError> {
    let mut context = ResourceGraph::new(settings.stack_name());
    let graph = stack::build_stack(&mut context, settings)?;
    let rendered = template::render(&graph)?;
    info!(
        stack = settings.stack_name(),
        resources = rendered.resources.len(),
        outputs = rendered.outputs.len(),
        "stack synthesised"
    );
    Ok(Synthesis {
        graph,
        template: rendered,
    })
}

/// Serialises a template as pretty JSON with a trailing newline.
///
/// # Errors
///
/// Returns [`SynthError::Serialise`] when serialisation fails.
pub fn render_json(template: &Template) -> Result<String, SynthError> {
    let mut json = serde_json::to_string_pretty(template)?;
    json.push('\n');
    Ok(json)
}

/// Writes `<out_dir>/<stack_name>.template.json`, creating `out_dir` when it
/// does not exist, and returns the written path.
///
/// # Errors
///
/// Returns [`SynthError::Io`] when the directory or file cannot be written
/// and [`SynthError::Serialise`] when serialisation fails.
pub fn write_template(
    out_dir: &Utf8Path,
    stack_name: &str,
    template: &Template,
) -> Result<Utf8PathBuf, SynthError> {
    let contents = render_json(template)?;
    let file_name = format!("{stack_name}{TEMPLATE_FILE_SUFFIX}");
    let path = out_dir.join(&file_name);

    Dir::create_ambient_dir_all(out_dir, ambient_authority()).map_err(|err| SynthError::Io {
        path: out_dir.to_path_buf(),
        message: err.to_string(),
    })?;
    let dir = Dir::open_ambient_dir(out_dir, ambient_authority()).map_err(|err| SynthError::Io {
        path: out_dir.to_path_buf(),
        message: err.to_string(),
    })?;
    dir.write(&file_name, contents.as_bytes())
        .map_err(|err| SynthError::Io {
            path: path.clone(),
            message: err.to_string(),
        })?;

    info!(path = %path, "template written");
    Ok(path)
}
