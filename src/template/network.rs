//! Expansion of a network descriptor into VPC, gateway, subnet, and routing
//! resources.

use serde_json::{Value, json};

use super::intrinsics::{availability_zone, name_tag, reference};
use super::{RenderedNetwork, RenderedSubnet, Renderer, TemplateError};
use crate::stack::resources::{AllocatedSubnet, Network, SubnetKind};

const ANY_IPV4: &str = "0.0.0.0/0";

impl Renderer<'_> {
    pub(super) fn render_network(&mut self, network: &Network) -> Result<(), TemplateError> {
        let vpc = self.ids.claim(&[network.id.as_str()])?;
        let path = self.construct_path(&network.id);
        self.add_resource(
            vpc.clone(),
            "AWS::EC2::VPC",
            json!({
                "CidrBlock": network.cidr.to_string(),
                "EnableDnsHostnames": true,
                "EnableDnsSupport": true,
                "InstanceTenancy": "default",
                "Tags": name_tag(&path),
            }),
            Vec::new(),
        );

        let gateway = if network.has_public_subnet() {
            Some(self.render_internet_gateway(network, &vpc, &path)?)
        } else {
            None
        };

        let mut public_subnets = Vec::new();
        for subnet in network.allocate_subnets()? {
            let rendered = self.render_subnet(network, &vpc, &subnet, gateway.as_ref())?;
            if subnet.kind == SubnetKind::Public {
                public_subnets.push(rendered);
            }
        }

        self.networks.insert(
            network.id.clone(),
            RenderedNetwork {
                public_subnets,
                vpc,
            },
        );
        Ok(())
    }

    fn render_internet_gateway(
        &mut self,
        network: &Network,
        vpc: &str,
        path: &str,
    ) -> Result<Gateway, TemplateError> {
        let gateway = self.ids.claim(&[network.id.as_str(), "IGW"])?;
        self.add_resource(
            gateway.clone(),
            "AWS::EC2::InternetGateway",
            json!({ "Tags": name_tag(path) }),
            Vec::new(),
        );

        let attachment = self.ids.claim(&[network.id.as_str(), "VPCGW"])?;
        self.add_resource(
            attachment.clone(),
            "AWS::EC2::VPCGatewayAttachment",
            json!({
                "InternetGatewayId": reference(&gateway),
                "VpcId": reference(vpc),
            }),
            Vec::new(),
        );

        Ok(Gateway {
            gateway,
            attachment,
        })
    }

    fn render_subnet(
        &mut self,
        network: &Network,
        vpc: &str,
        subnet: &AllocatedSubnet,
        gateway: Option<&Gateway>,
    ) -> Result<RenderedSubnet, TemplateError> {
        let subnet_name = format!("{}Subnet{}", subnet.group, u16::from(subnet.zone_index) + 1);
        let path = format!("{}/{subnet_name}", self.construct_path(&network.id));
        let is_public = subnet.kind == SubnetKind::Public;

        let subnet_id = self
            .ids
            .claim(&[network.id.as_str(), subnet_name.as_str(), "Subnet"])?;
        self.add_resource(
            subnet_id.clone(),
            "AWS::EC2::Subnet",
            json!({
                "AvailabilityZone": availability_zone(subnet.zone_index),
                "CidrBlock": subnet.cidr.to_string(),
                "MapPublicIpOnLaunch": is_public,
                "Tags": subnet_tags(&path, subnet),
                "VpcId": reference(vpc),
            }),
            Vec::new(),
        );

        let route_table = self
            .ids
            .claim(&[network.id.as_str(), subnet_name.as_str(), "RouteTable"])?;
        self.add_resource(
            route_table.clone(),
            "AWS::EC2::RouteTable",
            json!({
                "Tags": name_tag(&path),
                "VpcId": reference(vpc),
            }),
            Vec::new(),
        );

        let association = self.ids.claim(&[
            network.id.as_str(),
            subnet_name.as_str(),
            "RouteTableAssociation",
        ])?;
        self.add_resource(
            association,
            "AWS::EC2::SubnetRouteTableAssociation",
            json!({
                "RouteTableId": reference(&route_table),
                "SubnetId": reference(&subnet_id),
            }),
            Vec::new(),
        );

        if let Some(internet) = gateway.filter(|_| is_public) {
            let route = self
                .ids
                .claim(&[network.id.as_str(), subnet_name.as_str(), "DefaultRoute"])?;
            self.add_resource(
                route,
                "AWS::EC2::Route",
                json!({
                    "DestinationCidrBlock": ANY_IPV4,
                    "GatewayId": reference(&internet.gateway),
                    "RouteTableId": reference(&route_table),
                }),
                vec![internet.attachment.clone()],
            );
        }

        Ok(RenderedSubnet {
            logical_id: subnet_id,
            zone_index: subnet.zone_index,
        })
    }
}

struct Gateway {
    gateway: String,
    attachment: String,
}

fn subnet_tags(path: &str, subnet: &AllocatedSubnet) -> Value {
    json!([
        { "Key": "Name", "Value": path },
        { "Key": "spinup:subnet-name", "Value": subnet.group },
        { "Key": "spinup:subnet-type", "Value": subnet.kind.to_string() },
    ])
}
