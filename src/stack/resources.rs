//! Immutable resource descriptors and the constructor functions that produce
//! them.
//!
//! Descriptors are plain values: each constructor returns a fully specified
//! descriptor and the stack builder composes them by passing identifiers
//! between calls. Nothing here talks to a provider; rendering lives in
//! [`crate::template`].

use std::fmt;
use std::net::Ipv4Addr;
use std::ops::Deref;
use std::str::FromStr;

use thiserror::Error;

use crate::bootstrap::UserData;

macro_rules! newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name(String);

        impl $name {
            /// Wraps the given value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the wrapped value.
            #[must_use]
            pub const fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

newtype!(
    /// Construct identifier of a descriptor inside its stack (for example
    /// `demo-vpc`). Unique per graph.
    ResourceId
);
newtype!(
    /// Name of an EC2 key pair that must already exist in the target account.
    KeyPairName
);

/// Service principal trusted by the compute role.
pub const EC2_SERVICE_PRINCIPAL: &str = "ec2.amazonaws.com";

/// AWS managed policy granting read-only object storage access.
pub const S3_READ_ONLY_POLICY: &str = "AmazonS3ReadOnlyAccess";

/// Public SSM parameter resolving to the latest Amazon Linux 2 image.
pub const AMAZON_LINUX_2_SSM_PARAMETER: &str =
    "/aws/service/ami-amazon-linux-latest/amzn2-ami-hvm-x86_64-gp2";

/// Errors raised while parsing or subdividing CIDR blocks.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CidrError {
    /// Raised when the input is not `a.b.c.d/n`.
    #[error("invalid CIDR block '{0}': expected a.b.c.d/n")]
    Format(String),
    /// Raised when the prefix length exceeds 32.
    #[error("invalid CIDR prefix length {0}: must be at most 32")]
    Prefix(u8),
    /// Raised when the address has bits set outside the prefix.
    #[error("CIDR block '{0}' has host bits set")]
    HostBits(String),
    /// Raised when the requested subnets do not fit into the block.
    #[error("CIDR block {cidr} cannot hold {requested} subnets of size /{mask}")]
    Exhausted {
        /// Block being subdivided.
        cidr: String,
        /// Subnet mask requested.
        mask: u8,
        /// Number of subnets requested.
        requested: usize,
    },
}

/// An IPv4 network in CIDR notation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Cidr {
    /// The block matching every IPv4 address.
    pub const ANY: Self = Self {
        network: Ipv4Addr::UNSPECIFIED,
        prefix: 0,
    };

    /// Builds a CIDR block, rejecting prefixes above 32 and addresses with
    /// host bits set.
    ///
    /// # Errors
    ///
    /// Returns [`CidrError::Prefix`] or [`CidrError::HostBits`].
    pub fn new(network: Ipv4Addr, prefix: u8) -> Result<Self, CidrError> {
        if prefix > 32 {
            return Err(CidrError::Prefix(prefix));
        }
        if u32::from(network) & !prefix_mask(prefix) != 0 {
            return Err(CidrError::HostBits(format!("{network}/{prefix}")));
        }
        Ok(Self { network, prefix })
    }

    /// Network address of the block.
    #[must_use]
    pub const fn network(&self) -> Ipv4Addr {
        self.network
    }

    /// Prefix length of the block.
    #[must_use]
    pub const fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Number of `/mask` blocks that fit into this block, or `None` when the
    /// mask is shorter than the prefix or the count overflows.
    #[must_use]
    pub fn subnet_count(&self, mask: u8) -> Option<u32> {
        if mask < self.prefix || mask > 32 {
            return None;
        }
        1_u32.checked_shl(u32::from(mask - self.prefix))
    }

    /// Returns the `index`-th `/mask` block inside this block.
    #[must_use]
    pub fn subnet(&self, mask: u8, index: u32) -> Option<Self> {
        let count = self.subnet_count(mask)?;
        if index >= count {
            return None;
        }
        let size = 1_u32.checked_shl(u32::from(32 - mask))?;
        let offset = index.checked_mul(size)?;
        let base = u32::from(self.network).checked_add(offset)?;
        Some(Self {
            network: Ipv4Addr::from(base),
            prefix: mask,
        })
    }
}

fn prefix_mask(prefix: u8) -> u32 {
    u32::MAX
        .checked_shl(32 - u32::from(prefix))
        .unwrap_or(0)
}

impl FromStr for Ipv4Cidr {
    type Err = CidrError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (address, prefix) = trimmed
            .split_once('/')
            .ok_or_else(|| CidrError::Format(trimmed.to_owned()))?;
        let network = address
            .parse::<Ipv4Addr>()
            .map_err(|_| CidrError::Format(trimmed.to_owned()))?;
        let length = prefix
            .parse::<u8>()
            .map_err(|_| CidrError::Format(trimmed.to_owned()))?;
        Self::new(network, length)
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

/// Public subnets route to an internet gateway; private ones do not.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SubnetKind {
    /// Instances receive public addresses and a default internet route.
    Public,
    /// No internet route (this stack never creates NAT gateways).
    Private,
}

impl fmt::Display for SubnetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Public => "Public",
            Self::Private => "Private",
        })
    }
}

/// One subnet group of a network, replicated across availability zones.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubnetConfiguration {
    /// Group name (for example `public`).
    pub name: String,
    /// Mask size of each subnet in the group.
    pub cidr_mask: u8,
    /// Public or private classification.
    pub kind: SubnetKind,
}

/// Builds a public subnet group.
#[must_use]
pub fn public_subnet(name: impl Into<String>, cidr_mask: u8) -> SubnetConfiguration {
    SubnetConfiguration {
        name: name.into(),
        cidr_mask,
        kind: SubnetKind::Public,
    }
}

/// A concrete subnet after address allocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AllocatedSubnet {
    /// Group name the subnet belongs to.
    pub group: String,
    /// Classification copied from the group.
    pub kind: SubnetKind,
    /// Zero-based availability zone slot.
    pub zone_index: u8,
    /// Allocated address range.
    pub cidr: Ipv4Cidr,
}

/// Virtual network descriptor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Network {
    /// Construct identifier.
    pub id: ResourceId,
    /// Address range of the network.
    pub cidr: Ipv4Cidr,
    /// Number of availability zones each subnet group spans.
    pub max_azs: u8,
    /// Subnet groups in allocation order.
    pub subnets: Vec<SubnetConfiguration>,
    /// NAT gateways to create. Always zero for this stack.
    pub nat_gateways: u8,
}

impl Network {
    /// Returns `true` when at least one subnet group is public.
    #[must_use]
    pub fn has_public_subnet(&self) -> bool {
        self.subnets
            .iter()
            .any(|subnet| subnet.kind == SubnetKind::Public)
    }

    /// Allocates subnet address ranges group by group, zone by zone, from the
    /// bottom of the network range.
    ///
    /// # Errors
    ///
    /// Returns [`CidrError::Exhausted`] when the groups do not fit.
    pub fn allocate_subnets(&self) -> Result<Vec<AllocatedSubnet>, CidrError> {
        let requested = self
            .subnets
            .len()
            .saturating_mul(usize::from(self.max_azs));
        let mut allocated = Vec::with_capacity(requested);
        let mut cursor = u32::from(self.cidr.network());

        for group in &self.subnets {
            for zone_index in 0..self.max_azs {
                let exhausted = || CidrError::Exhausted {
                    cidr: self.cidr.to_string(),
                    mask: group.cidr_mask,
                    requested,
                };
                let block = self
                    .next_block(cursor, group.cidr_mask)
                    .ok_or_else(exhausted)?;
                let size = 1_u32
                    .checked_shl(u32::from(32 - group.cidr_mask))
                    .ok_or_else(exhausted)?;
                cursor = u32::from(block.network())
                    .checked_add(size)
                    .ok_or_else(exhausted)?;
                allocated.push(AllocatedSubnet {
                    group: group.name.clone(),
                    kind: group.kind,
                    zone_index,
                    cidr: block,
                });
            }
        }

        Ok(allocated)
    }

    /// Finds the first aligned `/mask` block at or above `cursor` that still
    /// lies within the network.
    fn next_block(&self, cursor: u32, mask: u8) -> Option<Ipv4Cidr> {
        let size = 1_u32.checked_shl(u32::from(32_u8.checked_sub(mask)?))?;
        let base = u32::from(self.cidr.network());
        let offset = cursor.checked_sub(base)?;
        let index = offset.div_ceil(size);
        self.cidr.subnet(mask, index)
    }
}

/// Builds a network descriptor. NAT gateways are fixed at zero.
#[must_use]
pub fn network(
    id: ResourceId,
    cidr: Ipv4Cidr,
    max_azs: u8,
    subnets: Vec<SubnetConfiguration>,
) -> Network {
    Network {
        id,
        cidr,
        max_azs,
        subnets,
        nat_gateways: 0,
    }
}

/// Transport protocol of an ingress rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Protocol {
    /// TCP.
    Tcp,
}

impl Protocol {
    /// Lowercase protocol name as used by EC2.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
        }
    }
}

/// Port range of an ingress rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Port {
    /// Protocol.
    pub protocol: Protocol,
    /// First port, inclusive.
    pub from: u16,
    /// Last port, inclusive.
    pub to: u16,
}

impl Port {
    /// A single TCP port.
    #[must_use]
    pub const fn tcp(port: u16) -> Self {
        Self {
            protocol: Protocol::Tcp,
            from: port,
            to: port,
        }
    }
}

/// Traffic source of an ingress rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Peer {
    /// Any IPv4 address (`0.0.0.0/0`).
    AnyIpv4,
    /// A specific IPv4 range.
    Ipv4(Ipv4Cidr),
}

impl Peer {
    /// CIDR block the peer stands for.
    #[must_use]
    pub const fn cidr(&self) -> Ipv4Cidr {
        match self {
            Self::AnyIpv4 => Ipv4Cidr::ANY,
            Self::Ipv4(cidr) => *cidr,
        }
    }
}

/// One inbound permission.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IngressRule {
    /// Source of the traffic.
    pub peer: Peer,
    /// Allowed ports.
    pub port: Port,
    /// Free-form description.
    pub description: String,
}

impl IngressRule {
    /// Returns `true` for a TCP/22 rule open to every IPv4 source.
    #[must_use]
    pub fn is_ssh_from_anywhere(&self) -> bool {
        self.peer.cidr() == Ipv4Cidr::ANY && self.port == Port::tcp(22)
    }
}

/// Security group descriptor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SecurityGroup {
    /// Construct identifier.
    pub id: ResourceId,
    /// Network the group belongs to.
    pub network: ResourceId,
    /// Group description.
    pub description: String,
    /// Whether all outbound traffic is allowed.
    pub allow_all_outbound: bool,
    /// Inbound rules in insertion order.
    pub ingress: Vec<IngressRule>,
}

impl SecurityGroup {
    /// Returns a copy of the group with one more ingress rule.
    #[must_use]
    pub fn with_ingress_rule(mut self, peer: Peer, port: Port, description: &str) -> Self {
        self.ingress.push(IngressRule {
            peer,
            port,
            description: description.to_owned(),
        });
        self
    }
}

/// Builds a security group bound to `network` with no ingress rules.
#[must_use]
pub fn security_group(
    id: ResourceId,
    network: &Network,
    description: &str,
    allow_all_outbound: bool,
) -> SecurityGroup {
    SecurityGroup {
        id,
        network: network.id.clone(),
        description: description.to_owned(),
        allow_all_outbound,
        ingress: Vec::new(),
    }
}

/// Provider-managed permission policy referenced by name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ManagedPolicy {
    /// Policy name, for example `AmazonS3ReadOnlyAccess`.
    pub name: String,
}

impl ManagedPolicy {
    /// References an AWS managed policy by name.
    #[must_use]
    pub fn aws_managed(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }
}

/// IAM role descriptor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Role {
    /// Construct identifier.
    pub id: ResourceId,
    /// Physical role name.
    pub role_name: String,
    /// Role description.
    pub description: String,
    /// The single service principal allowed to assume the role.
    pub assumed_by: String,
    /// Attached managed policies.
    pub managed_policies: Vec<ManagedPolicy>,
}

/// Builds a role trusted by the EC2 service principal only.
#[must_use]
pub fn compute_role(
    id: ResourceId,
    role_name: String,
    description: String,
    managed_policies: Vec<ManagedPolicy>,
) -> Role {
    Role {
        id,
        role_name,
        description,
        assumed_by: EC2_SERVICE_PRINCIPAL.to_owned(),
        managed_policies,
    }
}

/// Errors raised while parsing instance types and machine images.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseError {
    /// Raised for anything other than `<class>.<size>`.
    #[error("invalid instance type '{0}': expected <class>.<size>, for example t3.micro")]
    InstanceType(String),
    /// Raised for anything other than `amazon-linux-2` or `ami-<hex>`.
    #[error("invalid machine image '{0}': expected amazon-linux-2 or ami-<hex>")]
    MachineImage(String),
}

/// EC2 instance class and size, for example `t3.micro`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct InstanceType {
    class: String,
    size: String,
}

impl InstanceType {
    /// The burstable third-generation micro size.
    #[must_use]
    pub fn burstable3_micro() -> Self {
        Self {
            class: String::from("t3"),
            size: String::from("micro"),
        }
    }

    /// Instance class (`t3`).
    #[must_use]
    pub const fn class(&self) -> &str {
        self.class.as_str()
    }

    /// Instance size (`micro`).
    #[must_use]
    pub const fn size(&self) -> &str {
        self.size.as_str()
    }
}

fn is_type_part(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

impl FromStr for InstanceType {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.split_once('.') {
            Some((class, size)) if is_type_part(class) && is_type_part(size) => Ok(Self {
                class: class.to_owned(),
                size: size.to_owned(),
            }),
            _ => Err(ParseError::InstanceType(trimmed.to_owned())),
        }
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class, self.size)
    }
}

/// Machine image used to initialise the instance disk.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum MachineImage {
    /// Latest Amazon Linux 2, resolved at deploy time via SSM.
    AmazonLinux2,
    /// A fixed image identifier (`ami-…`).
    Ami(String),
}

impl FromStr for MachineImage {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("amazon-linux-2") {
            return Ok(Self::AmazonLinux2);
        }
        match trimmed.strip_prefix("ami-") {
            Some(hex) if !hex.is_empty() && hex.chars().all(|ch| ch.is_ascii_hexdigit()) => {
                Ok(Self::Ami(trimmed.to_ascii_lowercase()))
            }
            _ => Err(ParseError::MachineImage(trimmed.to_owned())),
        }
    }
}

impl fmt::Display for MachineImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmazonLinux2 => f.write_str("amazon-linux-2"),
            Self::Ami(id) => f.write_str(id),
        }
    }
}

/// Compute instance descriptor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instance {
    /// Construct identifier.
    pub id: ResourceId,
    /// Value of the `Name` tag.
    pub instance_name: String,
    /// Network the instance is launched into.
    pub network: ResourceId,
    /// Security group attached to the instance.
    pub security_group: ResourceId,
    /// Role exposed to the instance through an instance profile.
    pub role: ResourceId,
    /// Class and size.
    pub instance_type: InstanceType,
    /// Boot image.
    pub machine_image: MachineImage,
    /// SSH key pair.
    pub key_name: KeyPairName,
    /// First-boot script.
    pub user_data: UserData,
}

/// Placement and identity of an instance: which network, group, and role it
/// is bound to.
#[derive(Clone, Copy, Debug)]
pub struct InstanceBindings<'a> {
    /// Network to launch into.
    pub network: &'a Network,
    /// Security group to attach.
    pub security_group: &'a SecurityGroup,
    /// Role to expose.
    pub role: &'a Role,
}

/// Machine-level settings of an instance.
#[derive(Clone, Debug)]
pub struct InstanceSpec {
    /// Value of the `Name` tag.
    pub instance_name: String,
    /// Class and size.
    pub instance_type: InstanceType,
    /// Boot image.
    pub machine_image: MachineImage,
    /// SSH key pair.
    pub key_name: KeyPairName,
    /// First-boot script.
    pub user_data: UserData,
}

/// Builds an instance bound to exactly one network, security group, and role.
#[must_use]
pub fn instance(id: ResourceId, bindings: InstanceBindings<'_>, spec: InstanceSpec) -> Instance {
    Instance {
        id,
        instance_name: spec.instance_name,
        network: bindings.network.id.clone(),
        security_group: bindings.security_group.id.clone(),
        role: bindings.role.id.clone(),
        instance_type: spec.instance_type,
        machine_image: spec.machine_image,
        key_name: spec.key_name,
        user_data: spec.user_data,
    }
}

/// Instance attribute that an output can export.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InstanceAttribute {
    /// Public IPv4 address.
    PublicIp,
}

impl InstanceAttribute {
    /// Attribute name as understood by `Fn::GetAtt`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PublicIp => "PublicIp",
        }
    }
}

/// Named export surfaced once provisioning completes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Output {
    /// Construct identifier.
    pub id: ResourceId,
    /// Human-readable description, for example `Server 1 IP`.
    pub description: String,
    /// Instance whose attribute is exported.
    pub instance: ResourceId,
    /// Exported attribute.
    pub attribute: InstanceAttribute,
}

/// Builds an output exporting the public IPv4 address of `instance`.
#[must_use]
pub fn public_ip_output(id: ResourceId, instance: &Instance, description: &str) -> Output {
    Output {
        id,
        description: description.to_owned(),
        instance: instance.id.clone(),
        attribute: InstanceAttribute::PublicIp,
    }
}

/// Discriminant of a [`Resource`], used in errors and summaries.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    /// [`Network`].
    Network,
    /// [`SecurityGroup`].
    SecurityGroup,
    /// [`Role`].
    Role,
    /// [`Instance`].
    Instance,
    /// [`Output`].
    Output,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Network => "network",
            Self::SecurityGroup => "security-group",
            Self::Role => "role",
            Self::Instance => "instance",
            Self::Output => "output",
        })
    }
}

/// Any descriptor that can be registered with a synthesis context.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resource {
    /// Virtual network.
    Network(Network),
    /// Security group.
    SecurityGroup(SecurityGroup),
    /// IAM role.
    Role(Role),
    /// Compute instance.
    Instance(Instance),
    /// Stack output.
    Output(Output),
}

impl Resource {
    /// Construct identifier of the descriptor.
    #[must_use]
    pub const fn id(&self) -> &ResourceId {
        match self {
            Self::Network(network) => &network.id,
            Self::SecurityGroup(group) => &group.id,
            Self::Role(role) => &role.id,
            Self::Instance(instance) => &instance.id,
            Self::Output(output) => &output.id,
        }
    }

    /// Kind of the descriptor.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Network(_) => ResourceKind::Network,
            Self::SecurityGroup(_) => ResourceKind::SecurityGroup,
            Self::Role(_) => ResourceKind::Role,
            Self::Instance(_) => ResourceKind::Instance,
            Self::Output(_) => ResourceKind::Output,
        }
    }

    /// Identifiers this descriptor points at, with the kind each must have.
    #[must_use]
    pub fn references(&self) -> Vec<(&ResourceId, ResourceKind)> {
        match self {
            Self::Network(_) | Self::Role(_) => Vec::new(),
            Self::SecurityGroup(group) => vec![(&group.network, ResourceKind::Network)],
            Self::Instance(instance) => vec![
                (&instance.network, ResourceKind::Network),
                (&instance.security_group, ResourceKind::SecurityGroup),
                (&instance.role, ResourceKind::Role),
            ],
            Self::Output(output) => vec![(&output.instance, ResourceKind::Instance)],
        }
    }
}

/// One-line summary used by `spinup graph`.
impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<15} {}", self.kind(), self.id())?;
        match self {
            Self::Network(network) => {
                write!(f, " cidr={} azs={}", network.cidr, network.max_azs)?;
                for subnet in &network.subnets {
                    write!(
                        f,
                        " subnet={}/{}:{}",
                        subnet.name, subnet.cidr_mask, subnet.kind
                    )?;
                }
                write!(f, " nat_gateways={}", network.nat_gateways)
            }
            Self::SecurityGroup(group) => {
                write!(
                    f,
                    " network={} outbound={}",
                    group.network,
                    if group.allow_all_outbound { "all" } else { "none" }
                )?;
                for rule in &group.ingress {
                    write!(
                        f,
                        " ingress={}/{}-{}<-{}",
                        rule.port.protocol.as_str(),
                        rule.port.from,
                        rule.port.to,
                        rule.peer.cidr()
                    )?;
                }
                Ok(())
            }
            Self::Role(role) => {
                write!(f, " name={} principal={}", role.role_name, role.assumed_by)?;
                for policy in &role.managed_policies {
                    write!(f, " policy={}", policy.name)?;
                }
                Ok(())
            }
            Self::Instance(instance) => write!(
                f,
                " type={} image={} key={} network={} security_group={} role={}",
                instance.instance_type,
                instance.machine_image,
                instance.key_name,
                instance.network,
                instance.security_group,
                instance.role
            ),
            Self::Output(output) => write!(
                f,
                " \"{}\" = {}.{}",
                output.description,
                output.instance,
                output.attribute.as_str()
            ),
        }
    }
}
