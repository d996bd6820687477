//! Core library for the spinup stack synthesiser.
//!
//! The crate describes a single-server AWS deployment as a graph of typed
//! resource descriptors (network → security group → role → instance →
//! output) and renders that graph into a deterministic CloudFormation
//! template.

pub mod bootstrap;
pub mod config;
pub mod stack;
pub mod synth;
pub mod template;

pub use bootstrap::{BootstrapError, UserData, resolve_bootstrap_command};
pub use config::{ConfigError, StackConfig};
pub use stack::{
    GraphError, ResourceGraph, SettingsError, StackError, StackSettings, StackSettingsBuilder,
    SynthesisContext, build_stack,
};
pub use synth::{Synthesis, SynthError, render_json, synthesize, write_template};
pub use template::{Template, TemplateError, render};
