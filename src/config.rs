//! Configuration loading via `ortho-config`.

use std::fmt;

use ortho_config::OrthoConfig;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use thiserror::Error;

use crate::bootstrap::{BootstrapError, resolve_bootstrap_command};
use crate::stack::settings::{
    DEFAULT_INSTANCE_TYPE, DEFAULT_MACHINE_IMAGE, DEFAULT_MAX_AZS, DEFAULT_STACK_NAME,
    DEFAULT_SUBNET_CIDR_MASK, DEFAULT_VPC_CIDR,
};
use crate::stack::{SettingsError, StackSettings};

/// Stack configuration derived from environment variables, configuration
/// files, and defaults.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "SPINUP",
    discovery(
        app_name = "spinup",
        env_var = "SPINUP_CONFIG_PATH",
        config_file_name = "spinup.toml",
        dotfile_name = ".spinup.toml",
        project_file_name = "spinup.toml"
    )
)]
pub struct StackConfig {
    /// Project name prefixed to every resource identifier. Required.
    #[ortho_config(default = String::new())]
    #[serde(deserialize_with = "string_or_scalar")]
    pub project_name: String,
    /// Name of an existing EC2 key pair for SSH access. Required.
    #[ortho_config(default = String::new())]
    #[serde(deserialize_with = "string_or_scalar")]
    pub key_pair_name: String,
    /// Command run once when the server first boots. Exactly one of this and
    /// `server_init_command_file` must be set.
    #[serde(default, deserialize_with = "optional_string_or_scalar")]
    pub server_init_command: Option<String>,
    /// Path to a file holding the first-boot command. Supports `~/`.
    #[serde(default, deserialize_with = "optional_string_or_scalar")]
    pub server_init_command_file: Option<String>,
    /// Name of the deployable stack and of the written template file.
    #[ortho_config(default = DEFAULT_STACK_NAME.to_owned())]
    #[serde(deserialize_with = "string_or_scalar")]
    pub stack_name: String,
    /// Address range of the virtual network.
    #[ortho_config(default = DEFAULT_VPC_CIDR.to_owned())]
    pub vpc_cidr: String,
    /// Mask size of each public subnet.
    #[ortho_config(default = DEFAULT_SUBNET_CIDR_MASK)]
    pub subnet_cidr_mask: u8,
    /// Number of availability zones to spread public subnets over.
    #[ortho_config(default = DEFAULT_MAX_AZS)]
    pub max_azs: u8,
    /// EC2 instance type. Defaults to `t3.micro`.
    #[ortho_config(default = DEFAULT_INSTANCE_TYPE.to_owned())]
    pub instance_type: String,
    /// `amazon-linux-2` or an explicit `ami-…` identifier.
    #[ortho_config(default = DEFAULT_MACHINE_IMAGE.to_owned())]
    pub machine_image: String,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl StackConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to spinup.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("spinup")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields. Error messages include
    /// guidance on how to provide missing values via environment variables or
    /// configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty
    /// and [`ConfigError::BootstrapSource`] when the bootstrap command is
    /// given twice or not at all.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.project_name,
            &FieldMetadata::new("project name", "SPINUP_PROJECT_NAME", "project_name"),
        )?;
        Self::require_field(
            &self.key_pair_name,
            &FieldMetadata::new("SSH key pair name", "SPINUP_KEY_PAIR_NAME", "key_pair_name"),
        )?;
        Self::require_field(
            &self.stack_name,
            &FieldMetadata::new("stack name", "SPINUP_STACK_NAME", "stack_name"),
        )?;
        Self::require_field(
            &self.vpc_cidr,
            &FieldMetadata::new("VPC CIDR block", "SPINUP_VPC_CIDR", "vpc_cidr"),
        )?;
        Self::require_field(
            &self.instance_type,
            &FieldMetadata::new("instance type", "SPINUP_INSTANCE_TYPE", "instance_type"),
        )?;
        Self::require_field(
            &self.machine_image,
            &FieldMetadata::new("machine image", "SPINUP_MACHINE_IMAGE", "machine_image"),
        )?;

        match (&self.server_init_command, &self.server_init_command_file) {
            (Some(_), Some(_)) => Err(ConfigError::BootstrapSource(String::from(
                "set only one of SPINUP_SERVER_INIT_COMMAND and SPINUP_SERVER_INIT_COMMAND_FILE \
                 (server_init_command / server_init_command_file in spinup.toml)",
            ))),
            (None, None) => Err(ConfigError::MissingField(String::from(
                "missing bootstrap command: set SPINUP_SERVER_INIT_COMMAND or \
                 SPINUP_SERVER_INIT_COMMAND_FILE, or add server_init_command to spinup.toml",
            ))),
            _ => Ok(()),
        }
    }

    /// Resolves the bootstrap command and builds validated [`StackSettings`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails, the bootstrap file
    /// cannot be read, or a value is malformed.
    pub fn as_settings(&self) -> Result<StackSettings, ConfigError> {
        self.validate()?;
        let command = resolve_bootstrap_command(
            self.server_init_command.as_deref(),
            self.server_init_command_file.as_deref(),
        )?;
        StackSettings::builder()
            .stack_name(&self.stack_name)
            .project_name(&self.project_name)
            .key_pair_name(&self.key_pair_name)
            .bootstrap_command(command)
            .vpc_cidr(&self.vpc_cidr)
            .subnet_cidr_mask(self.subnet_cidr_mask)
            .max_azs(self.max_azs)
            .instance_type(&self.instance_type)
            .machine_image(&self.machine_image)
            .build()
            .map_err(ConfigError::from)
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates the bootstrap command was configured from both sources.
    #[error("conflicting bootstrap command sources: {0}")]
    BootstrapSource(String),
    /// Surfaces bootstrap command resolution failures.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// Surfaces malformed values.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] SettingsError),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

/// Accepts any scalar as text.
///
/// The environment provider types `SPINUP_KEY_PAIR_NAME=20240101` as an
/// integer and `SPINUP_SERVER_INIT_COMMAND=true` as a boolean. Free-form
/// fields take them back as written. Leading zeros and float formatting are
/// normalised by that typing; quote the value (`'"007"'`) to keep it exact.
struct ScalarText;

impl Visitor<'_> for ScalarText {
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a string, number, or boolean")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(value.to_owned())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
        Ok(value)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }

    fn visit_char<E: de::Error>(self, value: char) -> Result<Self::Value, E> {
        Ok(value.to_string())
    }
}

struct OptionalScalarText;

impl<'de> Visitor<'de> for OptionalScalarText {
    type Value = Option<String>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an optional string, number, or boolean")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        string_or_scalar(deserializer).map(Some)
    }
}

fn string_or_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(ScalarText)
}

fn optional_string_or_scalar<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    deserializer.deserialize_option(OptionalScalarText)
}
