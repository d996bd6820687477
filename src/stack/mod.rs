//! The single-server stack definition.
//!
//! [`build_stack`] composes a network, a security group allowing inbound SSH,
//! a role with read-only object storage access, one compute instance, and an
//! output exporting the instance's public address. Construction is a single
//! straight-line pass; every descriptor is registered with the caller's
//! [`SynthesisContext`] and collected into the returned [`ResourceGraph`].

pub mod graph;
pub mod resources;
pub mod settings;

use thiserror::Error;
use tracing::debug;

use crate::bootstrap::UserData;
pub use graph::{GraphError, ResourceGraph, SynthesisContext};
use resources::{
    InstanceBindings, InstanceSpec, ManagedPolicy, Peer, Port, Resource, ResourceId,
    S3_READ_ONLY_POLICY,
};
pub use settings::{SettingsError, StackSettings, StackSettingsBuilder};

/// Description of the exported public address.
pub const SERVER_IP_OUTPUT_DESCRIPTION: &str = "Server 1 IP";

const PUBLIC_SUBNET_GROUP: &str = "public";
const SECURITY_GROUP_DESCRIPTION: &str = "Allow outbound traffic and incomming ssh.";
const SSH_RULE_DESCRIPTION: &str = "Allow SSH from anywhere.";
const SSH_PORT: u16 = 22;

/// Errors raised while building the stack.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum StackError {
    /// Raised when the context or the graph rejects a descriptor.
    #[error("resource registration failed: {0}")]
    Graph(#[from] GraphError),
}

/// Builds the single-server resource graph and registers each descriptor
/// with `context`, in dependency order: network, security group, role,
/// instance, output.
///
/// # Errors
///
/// Returns [`StackError::Graph`] when `context` refuses a descriptor or the
/// finished graph violates a structural invariant.
pub fn build_stack<C>(context: &mut C, settings: &StackSettings) -> Result<ResourceGraph, StackError>
where
    C: SynthesisContext + ?Sized,
{
    let project = settings.project_name();
    let mut graph = ResourceGraph::new(context.stack_name());

    let vpc = resources::network(
        ResourceId::new(format!("{project}-vpc")),
        settings.vpc_cidr(),
        settings.max_azs(),
        vec![resources::public_subnet(
            PUBLIC_SUBNET_GROUP,
            settings.subnet_cidr_mask(),
        )],
    );
    commit(context, &mut graph, Resource::Network(vpc.clone()))?;

    let security_group = resources::security_group(
        ResourceId::new(format!("{project}-security-group")),
        &vpc,
        SECURITY_GROUP_DESCRIPTION,
        true,
    )
    .with_ingress_rule(Peer::AnyIpv4, Port::tcp(SSH_PORT), SSH_RULE_DESCRIPTION);
    commit(
        context,
        &mut graph,
        Resource::SecurityGroup(security_group.clone()),
    )?;

    let role = resources::compute_role(
        ResourceId::new(format!("{project}-role")),
        format!("{project}EC2"),
        format!("Role for compute servers created in the {project}."),
        vec![ManagedPolicy::aws_managed(S3_READ_ONLY_POLICY)],
    );
    commit(context, &mut graph, Resource::Role(role.clone()))?;

    let server = resources::instance(
        ResourceId::new(format!("{project}-EC2-instance")),
        InstanceBindings {
            network: &vpc,
            security_group: &security_group,
            role: &role,
        },
        InstanceSpec {
            instance_name: format!("{project}-server-1"),
            instance_type: settings.instance_type().clone(),
            machine_image: settings.machine_image().clone(),
            key_name: settings.key_pair_name().clone(),
            user_data: UserData::for_linux().with_command(settings.bootstrap_command()),
        },
    );
    commit(context, &mut graph, Resource::Instance(server.clone()))?;

    let output = resources::public_ip_output(
        ResourceId::new(format!("{project}-server-ip-output")),
        &server,
        SERVER_IP_OUTPUT_DESCRIPTION,
    );
    commit(context, &mut graph, Resource::Output(output))?;

    graph.validate()?;
    debug!(
        stack = graph.stack_name(),
        resources = graph.len(),
        "stack definition assembled"
    );
    Ok(graph)
}

fn commit<C>(context: &mut C, graph: &mut ResourceGraph, resource: Resource) -> Result<(), StackError>
where
    C: SynthesisContext + ?Sized,
{
    debug!(id = %resource.id(), kind = %resource.kind(), "registering resource");
    graph.insert(resource.clone())?;
    context.register(resource)?;
    Ok(())
}
