//! Rendering of a [`ResourceGraph`] into a CloudFormation template.
//!
//! Each descriptor expands into one or more CloudFormation resources. The
//! network expands the most: VPC, internet gateway, and per subnet a route
//! table with its association and default route. All maps are ordered by
//! logical ID so the same graph always serialises to the same bytes.

mod compute;
mod iam;
pub mod intrinsics;
mod logical_id;
mod network;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::stack::resources::{CidrError, Output, Resource, ResourceId};
use crate::stack::{GraphError, ResourceGraph};
use logical_id::LogicalIds;
pub use logical_id::logical_id;

/// Template format version understood by CloudFormation.
pub const FORMAT_VERSION: &str = "2010-09-09";

/// Errors raised while rendering a template.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TemplateError {
    /// Raised when the graph fails its structural checks.
    #[error("resource graph is invalid: {0}")]
    Graph(#[from] GraphError),
    /// Raised when a construct path leaves no usable logical ID.
    #[error("cannot derive a logical id from '{0}'")]
    LogicalId(String),
    /// Raised when two resources sanitise to the same logical ID.
    #[error("logical id '{0}' is used more than once")]
    LogicalIdCollision(String),
    /// Raised when subnet allocation fails.
    #[error("network address allocation failed: {0}")]
    Cidr(#[from] CidrError),
    /// Raised when a descriptor points at something not yet rendered.
    #[error("{owner} depends on '{target}', which was not rendered")]
    Unrendered {
        /// Descriptor holding the reference.
        owner: ResourceId,
        /// Missing dependency.
        target: ResourceId,
    },
    /// Raised when an instance's network has no public subnet to launch in.
    #[error("network {0} has no public subnet to place an instance in")]
    NoPublicSubnet(ResourceId),
}

/// A CloudFormation template document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Template {
    /// Always [`FORMAT_VERSION`].
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    /// Free-form description.
    #[serde(rename = "Description")]
    pub description: String,
    /// Deploy-time parameters keyed by logical ID.
    #[serde(rename = "Parameters", skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,
    /// Resources keyed by logical ID.
    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, CfnResource>,
    /// Outputs keyed by logical ID.
    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, CfnOutput>,
}

impl Template {
    /// Looks up resources of one CloudFormation type.
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a CfnResource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, resource)| resource.resource_type == resource_type)
    }
}

/// A template parameter.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    /// Parameter type.
    #[serde(rename = "Type")]
    pub parameter_type: String,
    /// Default value.
    pub default: String,
}

/// A template resource.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnResource {
    /// CloudFormation type, for example `AWS::EC2::VPC`.
    #[serde(rename = "Type")]
    pub resource_type: String,
    /// Resource properties.
    pub properties: Value,
    /// Explicit creation-order dependencies.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

/// A template output.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CfnOutput {
    /// Human-readable description.
    pub description: String,
    /// Exported value.
    pub value: Value,
}

/// Logical IDs produced for a network, reused by dependants.
#[derive(Clone, Debug)]
struct RenderedNetwork {
    public_subnets: Vec<RenderedSubnet>,
    vpc: String,
}

#[derive(Clone, Debug)]
struct RenderedSubnet {
    logical_id: String,
    zone_index: u8,
}

/// Accumulates the template while walking the graph in registration order.
struct Renderer<'g> {
    graph: &'g ResourceGraph,
    template: Template,
    ids: LogicalIds,
    networks: BTreeMap<ResourceId, RenderedNetwork>,
    security_groups: BTreeMap<ResourceId, String>,
    roles: BTreeMap<ResourceId, String>,
    instances: BTreeMap<ResourceId, String>,
}

/// Renders `graph` into a template.
///
/// # Errors
///
/// Returns [`TemplateError`] when the graph is invalid, logical IDs collide,
/// or subnets do not fit their network.
pub fn render(graph: &ResourceGraph) -> Result<Template, TemplateError> {
    graph.validate()?;
    let mut renderer = Renderer::new(graph);
    for resource in graph {
        renderer.render_resource(resource)?;
    }
    debug!(
        stack = graph.stack_name(),
        resources = renderer.template.resources.len(),
        "template rendered"
    );
    Ok(renderer.template)
}

impl<'g> Renderer<'g> {
    fn new(graph: &'g ResourceGraph) -> Self {
        Self {
            graph,
            template: Template {
                format_version: FORMAT_VERSION.to_owned(),
                description: format!(
                    "{}: single-server environment (VPC, security group, IAM role, EC2 instance)",
                    graph.stack_name()
                ),
                parameters: BTreeMap::new(),
                resources: BTreeMap::new(),
                outputs: BTreeMap::new(),
            },
            ids: LogicalIds::default(),
            networks: BTreeMap::new(),
            security_groups: BTreeMap::new(),
            roles: BTreeMap::new(),
            instances: BTreeMap::new(),
        }
    }

    fn render_resource(&mut self, resource: &Resource) -> Result<(), TemplateError> {
        match resource {
            Resource::Network(network) => self.render_network(network),
            Resource::SecurityGroup(group) => self.render_security_group(group),
            Resource::Role(role) => self.render_role(role),
            Resource::Instance(instance) => self.render_instance(instance),
            Resource::Output(output) => self.render_output(output),
        }
    }

    fn add_resource(
        &mut self,
        logical_id: String,
        resource_type: &str,
        properties: Value,
        depends_on: Vec<String>,
    ) {
        self.template.resources.insert(
            logical_id,
            CfnResource {
                resource_type: resource_type.to_owned(),
                properties,
                depends_on,
            },
        );
    }

    /// `Name` tag value: the construct path inside the stack.
    fn construct_path(&self, id: &ResourceId) -> String {
        format!("{}/{id}", self.graph.stack_name())
    }

    fn render_output(&mut self, output: &Output) -> Result<(), TemplateError> {
        let instance = self
            .instances
            .get(&output.instance)
            .cloned()
            .ok_or_else(|| unrendered(&output.id, &output.instance))?;
        let logical_id = self.ids.claim(&[output.id.as_str()])?;
        self.template.outputs.insert(
            logical_id,
            CfnOutput {
                description: output.description.clone(),
                value: intrinsics::get_att(&instance, output.attribute.as_str()),
            },
        );
        Ok(())
    }
}

fn unrendered(owner: &ResourceId, target: &ResourceId) -> TemplateError {
    TemplateError::Unrendered {
        owner: owner.clone(),
        target: target.clone(),
    }
}
