//! Validated settings consumed by the stack builder.

use thiserror::Error;

use super::resources::{InstanceType, Ipv4Cidr, KeyPairName, MachineImage};

/// Stack name used when none is configured.
pub const DEFAULT_STACK_NAME: &str = "SpinUpServerStack";
/// Address range of the virtual network.
pub const DEFAULT_VPC_CIDR: &str = "10.0.0.0/16";
/// Mask size of each public subnet.
pub const DEFAULT_SUBNET_CIDR_MASK: u8 = 24;
/// Number of availability zones the public subnet group spans.
pub const DEFAULT_MAX_AZS: u8 = 2;
/// Burstable third-generation micro instance.
pub const DEFAULT_INSTANCE_TYPE: &str = "t3.micro";
/// Latest Amazon Linux 2 image.
pub const DEFAULT_MACHINE_IMAGE: &str = "amazon-linux-2";

const MAX_STACK_NAME_LEN: usize = 128;
/// IAM caps role names at 64 characters and the role is `{project}EC2`.
const MAX_PROJECT_NAME_LEN: usize = 61;
const MIN_VPC_PREFIX: u8 = 16;
const MAX_SUBNET_MASK: u8 = 28;

/// Errors raised when settings fail validation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SettingsError {
    /// Raised when a required field is empty.
    #[error("missing or empty field: {0}")]
    Validation(String),
    /// Raised when a field is present but malformed.
    #[error("invalid {field}: {message}")]
    Invalid {
        /// Field name.
        field: String,
        /// What is wrong with it.
        message: String,
    },
}

impl SettingsError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_owned(),
            message: message.into(),
        }
    }
}

/// Everything the stack builder needs, validated at construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StackSettings {
    stack_name: String,
    project_name: String,
    key_pair_name: KeyPairName,
    bootstrap_command: String,
    vpc_cidr: Ipv4Cidr,
    subnet_cidr_mask: u8,
    max_azs: u8,
    instance_type: InstanceType,
    machine_image: MachineImage,
}

impl StackSettings {
    /// Starts a builder for [`StackSettings`].
    #[must_use]
    pub fn builder() -> StackSettingsBuilder {
        StackSettingsBuilder::new()
    }

    /// Name of the deployable stack.
    #[must_use]
    pub const fn stack_name(&self) -> &str {
        self.stack_name.as_str()
    }

    /// Project name used as prefix for every resource identifier.
    #[must_use]
    pub const fn project_name(&self) -> &str {
        self.project_name.as_str()
    }

    /// SSH key pair installed on the instance.
    #[must_use]
    pub const fn key_pair_name(&self) -> &KeyPairName {
        &self.key_pair_name
    }

    /// Command run once at first boot.
    #[must_use]
    pub const fn bootstrap_command(&self) -> &str {
        self.bootstrap_command.as_str()
    }

    /// Address range of the virtual network.
    #[must_use]
    pub const fn vpc_cidr(&self) -> Ipv4Cidr {
        self.vpc_cidr
    }

    /// Mask size of each public subnet.
    #[must_use]
    pub const fn subnet_cidr_mask(&self) -> u8 {
        self.subnet_cidr_mask
    }

    /// Number of availability zones to spread subnets over.
    #[must_use]
    pub const fn max_azs(&self) -> u8 {
        self.max_azs
    }

    /// Instance class and size.
    #[must_use]
    pub const fn instance_type(&self) -> &InstanceType {
        &self.instance_type
    }

    /// Boot image.
    #[must_use]
    pub const fn machine_image(&self) -> &MachineImage {
        &self.machine_image
    }
}

/// Builder for [`StackSettings`] that defers trimming, parsing, and
/// validation to [`StackSettingsBuilder::build`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StackSettingsBuilder {
    stack_name: String,
    project_name: String,
    key_pair_name: String,
    bootstrap_command: String,
    vpc_cidr: String,
    subnet_cidr_mask: u8,
    max_azs: u8,
    instance_type: String,
    machine_image: String,
}

impl Default for StackSettingsBuilder {
    fn default() -> Self {
        Self {
            stack_name: DEFAULT_STACK_NAME.to_owned(),
            project_name: String::new(),
            key_pair_name: String::new(),
            bootstrap_command: String::new(),
            vpc_cidr: DEFAULT_VPC_CIDR.to_owned(),
            subnet_cidr_mask: DEFAULT_SUBNET_CIDR_MASK,
            max_azs: DEFAULT_MAX_AZS,
            instance_type: DEFAULT_INSTANCE_TYPE.to_owned(),
            machine_image: DEFAULT_MACHINE_IMAGE.to_owned(),
        }
    }
}

impl StackSettingsBuilder {
    /// Creates a builder holding the network and instance defaults; project
    /// name, key pair, and bootstrap command must be set before build.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stack name.
    #[must_use]
    pub fn stack_name(mut self, value: impl Into<String>) -> Self {
        self.stack_name = value.into();
        self
    }

    /// Sets the project name.
    #[must_use]
    pub fn project_name(mut self, value: impl Into<String>) -> Self {
        self.project_name = value.into();
        self
    }

    /// Sets the SSH key pair name.
    #[must_use]
    pub fn key_pair_name(mut self, value: impl Into<String>) -> Self {
        self.key_pair_name = value.into();
        self
    }

    /// Sets the bootstrap command.
    #[must_use]
    pub fn bootstrap_command(mut self, value: impl Into<String>) -> Self {
        self.bootstrap_command = value.into();
        self
    }

    /// Sets the network address range.
    #[must_use]
    pub fn vpc_cidr(mut self, value: impl Into<String>) -> Self {
        self.vpc_cidr = value.into();
        self
    }

    /// Sets the public subnet mask size.
    #[must_use]
    pub const fn subnet_cidr_mask(mut self, value: u8) -> Self {
        self.subnet_cidr_mask = value;
        self
    }

    /// Sets the number of availability zones.
    #[must_use]
    pub const fn max_azs(mut self, value: u8) -> Self {
        self.max_azs = value;
        self
    }

    /// Sets the instance type.
    #[must_use]
    pub fn instance_type(mut self, value: impl Into<String>) -> Self {
        self.instance_type = value.into();
        self
    }

    /// Sets the machine image.
    #[must_use]
    pub fn machine_image(mut self, value: impl Into<String>) -> Self {
        self.machine_image = value.into();
        self
    }

    /// Builds and validates the [`StackSettings`], trimming string inputs.
    ///
    /// The bootstrap command is only checked for emptiness; its content is
    /// kept as given.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Validation`] when a required field is empty
    /// and [`SettingsError::Invalid`] when a field cannot be parsed or falls
    /// outside the accepted range.
    pub fn build(self) -> Result<StackSettings, SettingsError> {
        let project_name = required("project_name", &self.project_name)?;
        let key_pair_name = required("key_pair_name", &self.key_pair_name)?;
        if self.bootstrap_command.trim().is_empty() {
            return Err(SettingsError::Validation(String::from("bootstrap_command")));
        }
        let stack_name = required("stack_name", &self.stack_name)?;
        let vpc_cidr_text = required("vpc_cidr", &self.vpc_cidr)?;
        let instance_type_text = required("instance_type", &self.instance_type)?;
        let machine_image_text = required("machine_image", &self.machine_image)?;

        validate_name("project_name", &project_name, MAX_PROJECT_NAME_LEN)?;
        validate_name("stack_name", &stack_name, MAX_STACK_NAME_LEN)?;

        let vpc_cidr: Ipv4Cidr = vpc_cidr_text
            .parse()
            .map_err(|err| SettingsError::invalid("vpc_cidr", format!("{err}")))?;
        validate_network_layout(vpc_cidr, self.subnet_cidr_mask, self.max_azs)?;

        let instance_type: InstanceType = instance_type_text
            .parse()
            .map_err(|err| SettingsError::invalid("instance_type", format!("{err}")))?;
        let machine_image: MachineImage = machine_image_text
            .parse()
            .map_err(|err| SettingsError::invalid("machine_image", format!("{err}")))?;

        Ok(StackSettings {
            stack_name,
            project_name,
            key_pair_name: KeyPairName::from(key_pair_name),
            bootstrap_command: self.bootstrap_command,
            vpc_cidr,
            subnet_cidr_mask: self.subnet_cidr_mask,
            max_azs: self.max_azs,
            instance_type,
            machine_image,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, SettingsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SettingsError::Validation(field.to_owned()));
    }
    Ok(trimmed.to_owned())
}

/// Names become part of resource and stack names: a letter first, then
/// letters, digits, or hyphens.
fn validate_name(field: &str, value: &str, max_len: usize) -> Result<(), SettingsError> {
    if value.len() > max_len {
        return Err(SettingsError::invalid(
            field,
            format!("must be at most {max_len} characters"),
        ));
    }
    let mut chars = value.chars();
    let starts_with_letter = chars.next().is_some_and(|ch| ch.is_ascii_alphabetic());
    if !starts_with_letter || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '-') {
        return Err(SettingsError::invalid(
            field,
            format!("'{value}' must start with a letter and contain only letters, digits, and hyphens"),
        ));
    }
    Ok(())
}

fn validate_network_layout(cidr: Ipv4Cidr, mask: u8, max_azs: u8) -> Result<(), SettingsError> {
    if cidr.prefix() < MIN_VPC_PREFIX || cidr.prefix() > MAX_SUBNET_MASK {
        return Err(SettingsError::invalid(
            "vpc_cidr",
            format!("prefix length must be between /{MIN_VPC_PREFIX} and /{MAX_SUBNET_MASK}, got {cidr}"),
        ));
    }
    if mask < cidr.prefix() || mask > MAX_SUBNET_MASK {
        return Err(SettingsError::invalid(
            "subnet_cidr_mask",
            format!(
                "must be between /{} and /{MAX_SUBNET_MASK}, got /{mask}",
                cidr.prefix()
            ),
        ));
    }
    if max_azs == 0 {
        return Err(SettingsError::invalid("max_azs", "must be at least 1"));
    }
    let capacity = cidr.subnet_count(mask).unwrap_or(0);
    if u32::from(max_azs) > capacity {
        return Err(SettingsError::invalid(
            "max_azs",
            format!("{cidr} holds only {capacity} subnets of size /{mask}, {max_azs} requested"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> StackSettingsBuilder {
        StackSettings::builder()
            .project_name("demo")
            .key_pair_name("demo-key")
            .bootstrap_command("yum install -y git")
    }

    #[test]
    fn defaults_match_the_single_server_layout() {
        let settings = base()
            .build()
            .unwrap_or_else(|err| panic!("defaults should build: {err}"));

        assert_eq!(settings.stack_name(), DEFAULT_STACK_NAME);
        assert_eq!(settings.vpc_cidr().to_string(), "10.0.0.0/16");
        assert_eq!(settings.subnet_cidr_mask(), 24);
        assert_eq!(settings.max_azs(), 2);
        assert_eq!(settings.instance_type().to_string(), "t3.micro");
        assert_eq!(settings.machine_image(), &MachineImage::AmazonLinux2);
    }

    #[test]
    fn bootstrap_command_is_not_trimmed() {
        let settings = base()
            .bootstrap_command("  echo hi  ")
            .build()
            .unwrap_or_else(|err| panic!("should build: {err}"));
        assert_eq!(settings.bootstrap_command(), "  echo hi  ");
    }

    #[test]
    fn project_name_leaves_room_for_the_role_suffix() {
        let longest = "p".repeat(61);
        let settings = base()
            .project_name(&longest)
            .build()
            .unwrap_or_else(|err| panic!("61 characters fit: {err}"));
        assert_eq!(settings.project_name(), longest);

        let err = base()
            .project_name("p".repeat(62))
            .build()
            .expect_err("role name would exceed 64 characters");
        assert_eq!(
            err,
            SettingsError::invalid("project_name", "must be at most 61 characters")
        );
    }

    #[test]
    fn stack_name_allows_longer_values_than_project_name() {
        let settings = base()
            .stack_name("s".repeat(128))
            .build()
            .unwrap_or_else(|err| panic!("128 characters fit: {err}"));
        assert_eq!(settings.stack_name().len(), 128);
    }

    #[test]
    fn rejects_project_names_with_spaces() {
        let err = base()
            .project_name("my project")
            .build()
            .expect_err("spaces are not allowed");
        assert!(matches!(err, SettingsError::Invalid { ref field, .. } if field == "project_name"));
    }

    #[test]
    fn rejects_subnet_mask_shorter_than_vpc_prefix() {
        let err = base()
            .subnet_cidr_mask(8)
            .build()
            .expect_err("mask must be inside the vpc");
        assert!(
            matches!(err, SettingsError::Invalid { ref field, .. } if field == "subnet_cidr_mask")
        );
    }

    #[test]
    fn rejects_more_zones_than_subnets_fit() {
        let err = base()
            .vpc_cidr("10.0.0.0/24")
            .subnet_cidr_mask(24)
            .max_azs(2)
            .build()
            .expect_err("a /24 holds one /24");
        assert!(matches!(err, SettingsError::Invalid { ref field, .. } if field == "max_azs"));
    }

    #[test]
    fn rejects_zero_zones() {
        let err = base().max_azs(0).build().expect_err("zero zones");
        assert!(matches!(err, SettingsError::Invalid { ref field, .. } if field == "max_azs"));
    }
}
