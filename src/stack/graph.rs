//! Resource graph container and the synthesis context capability.

use thiserror::Error;

use super::resources::{Instance, Network, Output, Resource, ResourceId, ResourceKind, Role};
use super::resources::{InstanceAttribute, SecurityGroup};

/// Errors raised while registering descriptors or checking graph invariants.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum GraphError {
    /// Raised when an identifier is registered twice.
    #[error("resource id '{0}' is already registered")]
    DuplicateId(ResourceId),
    /// Raised when a descriptor references an identifier that is not yet
    /// registered.
    #[error("{owner} references unknown resource '{target}'")]
    UnknownReference {
        /// Descriptor holding the reference.
        owner: ResourceId,
        /// Missing identifier.
        target: ResourceId,
    },
    /// Raised when a reference points at the wrong kind of descriptor.
    #[error("{owner} expects '{target}' to be a {expected}, found a {found}")]
    ReferenceKind {
        /// Descriptor holding the reference.
        owner: ResourceId,
        /// Referenced identifier.
        target: ResourceId,
        /// Kind the reference requires.
        expected: ResourceKind,
        /// Kind actually registered.
        found: ResourceKind,
    },
    /// Raised when an instance is placed in a network without public subnets.
    #[error("instance {instance} needs a public subnet but network {network} has none")]
    NoPublicSubnet {
        /// Instance identifier.
        instance: ResourceId,
        /// Network identifier.
        network: ResourceId,
    },
    /// Raised when a security group and instance disagree on the network.
    #[error("security group {group} belongs to {group_network}, instance {instance} to {network}")]
    NetworkMismatch {
        /// Instance identifier.
        instance: ResourceId,
        /// Network the instance is launched into.
        network: ResourceId,
        /// Security group identifier.
        group: ResourceId,
        /// Network the group belongs to.
        group_network: ResourceId,
    },
}

/// Capability through which the stack builder registers descriptors.
///
/// Implementations decide what registration means: [`ResourceGraph`] records
/// descriptors in order, tests may count or reject them.
pub trait SynthesisContext {
    /// Name of the enclosing stack.
    fn stack_name(&self) -> &str;

    /// Registers a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] when the descriptor cannot be accepted.
    fn register(&mut self, resource: Resource) -> Result<(), GraphError>;
}

/// Ordered, reference-checked collection of descriptors for one stack.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResourceGraph {
    stack_name: String,
    resources: Vec<Resource>,
}

impl ResourceGraph {
    /// Creates an empty graph for the named stack.
    #[must_use]
    pub fn new(stack_name: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            resources: Vec::new(),
        }
    }

    /// Name of the stack the graph belongs to.
    #[must_use]
    pub const fn stack_name(&self) -> &str {
        self.stack_name.as_str()
    }

    /// Inserts a descriptor after checking its id is fresh and every
    /// reference points at an already registered descriptor of the right
    /// kind.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateId`], [`GraphError::UnknownReference`]
    /// or [`GraphError::ReferenceKind`].
    pub fn insert(&mut self, resource: Resource) -> Result<(), GraphError> {
        if self.get(resource.id()).is_some() {
            return Err(GraphError::DuplicateId(resource.id().clone()));
        }

        for (target, expected) in resource.references() {
            let found = self
                .get(target)
                .ok_or_else(|| GraphError::UnknownReference {
                    owner: resource.id().clone(),
                    target: target.clone(),
                })?
                .kind();
            if found != expected {
                return Err(GraphError::ReferenceKind {
                    owner: resource.id().clone(),
                    target: target.clone(),
                    expected,
                    found,
                });
            }
        }

        self.resources.push(resource);
        Ok(())
    }

    /// Looks up a descriptor by identifier.
    #[must_use]
    pub fn get(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|resource| resource.id() == id)
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Number of registered descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns `true` when nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Looks up a network by identifier.
    #[must_use]
    pub fn network(&self, id: &ResourceId) -> Option<&Network> {
        match self.get(id) {
            Some(Resource::Network(network)) => Some(network),
            _ => None,
        }
    }

    /// Looks up a security group by identifier.
    #[must_use]
    pub fn security_group(&self, id: &ResourceId) -> Option<&SecurityGroup> {
        match self.get(id) {
            Some(Resource::SecurityGroup(group)) => Some(group),
            _ => None,
        }
    }

    /// Looks up a role by identifier.
    #[must_use]
    pub fn role(&self, id: &ResourceId) -> Option<&Role> {
        match self.get(id) {
            Some(Resource::Role(role)) => Some(role),
            _ => None,
        }
    }

    /// All networks in registration order.
    pub fn networks(&self) -> impl Iterator<Item = &Network> {
        self.resources.iter().filter_map(|resource| match resource {
            Resource::Network(network) => Some(network),
            _ => None,
        })
    }

    /// All security groups in registration order.
    pub fn security_groups(&self) -> impl Iterator<Item = &SecurityGroup> {
        self.resources.iter().filter_map(|resource| match resource {
            Resource::SecurityGroup(group) => Some(group),
            _ => None,
        })
    }

    /// All roles in registration order.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.resources.iter().filter_map(|resource| match resource {
            Resource::Role(role) => Some(role),
            _ => None,
        })
    }

    /// All instances in registration order.
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.resources.iter().filter_map(|resource| match resource {
            Resource::Instance(instance) => Some(instance),
            _ => None,
        })
    }

    /// All outputs in registration order.
    pub fn outputs(&self) -> impl Iterator<Item = &Output> {
        self.resources.iter().filter_map(|resource| match resource {
            Resource::Output(output) => Some(output),
            _ => None,
        })
    }

    /// Checks invariants that span several descriptors: an instance that
    /// exports a public address must sit in a network with a public subnet,
    /// and its security group must belong to the same network.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoPublicSubnet`] or
    /// [`GraphError::NetworkMismatch`].
    pub fn validate(&self) -> Result<(), GraphError> {
        for instance in self.instances() {
            if let Some(group) = self.security_group(&instance.security_group)
                && group.network != instance.network
            {
                return Err(GraphError::NetworkMismatch {
                    instance: instance.id.clone(),
                    network: instance.network.clone(),
                    group: group.id.clone(),
                    group_network: group.network.clone(),
                });
            }

            let exports_public_address = self.outputs().any(|output| {
                output.instance == instance.id && output.attribute == InstanceAttribute::PublicIp
            });
            let has_public_subnet = self
                .network(&instance.network)
                .is_some_and(Network::has_public_subnet);
            if exports_public_address && !has_public_subnet {
                return Err(GraphError::NoPublicSubnet {
                    instance: instance.id.clone(),
                    network: instance.network.clone(),
                });
            }
        }
        Ok(())
    }
}

impl SynthesisContext for ResourceGraph {
    fn stack_name(&self) -> &str {
        self.stack_name.as_str()
    }

    fn register(&mut self, resource: Resource) -> Result<(), GraphError> {
        self.insert(resource)
    }
}

impl<'a> IntoIterator for &'a ResourceGraph {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}
