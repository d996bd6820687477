//! Security group and instance rendering.

use serde_json::{Value, json};

use super::intrinsics::{availability_zone, base64, get_att, name_tag, reference};
use super::{Parameter, Renderer, TemplateError, logical_id, unrendered};
use crate::stack::resources::{
    AMAZON_LINUX_2_SSM_PARAMETER, Instance, IngressRule, MachineImage, SecurityGroup,
};

const SSM_IMAGE_PARAMETER_TYPE: &str = "AWS::SSM::Parameter::Value<AWS::EC2::Image::Id>";

impl Renderer<'_> {
    pub(super) fn render_security_group(
        &mut self,
        group: &SecurityGroup,
    ) -> Result<(), TemplateError> {
        let vpc = self
            .networks
            .get(&group.network)
            .map(|network| network.vpc.clone())
            .ok_or_else(|| unrendered(&group.id, &group.network))?;
        let logical_id = self.ids.claim(&[group.id.as_str()])?;
        let ingress: Vec<Value> = group.ingress.iter().map(ingress_rule).collect();

        self.add_resource(
            logical_id.clone(),
            "AWS::EC2::SecurityGroup",
            json!({
                "GroupDescription": group.description,
                "SecurityGroupEgress": egress_rules(group.allow_all_outbound),
                "SecurityGroupIngress": ingress,
                "VpcId": reference(&vpc),
            }),
            Vec::new(),
        );
        self.security_groups.insert(group.id.clone(), logical_id);
        Ok(())
    }

    pub(super) fn render_instance(&mut self, instance: &Instance) -> Result<(), TemplateError> {
        let subnet = self
            .networks
            .get(&instance.network)
            .ok_or_else(|| unrendered(&instance.id, &instance.network))?
            .public_subnets
            .first()
            .cloned()
            .ok_or_else(|| TemplateError::NoPublicSubnet(instance.network.clone()))?;
        let group = self
            .security_groups
            .get(&instance.security_group)
            .cloned()
            .ok_or_else(|| unrendered(&instance.id, &instance.security_group))?;
        let role = self
            .roles
            .get(&instance.role)
            .cloned()
            .ok_or_else(|| unrendered(&instance.id, &instance.role))?;

        let profile = self
            .ids
            .claim(&[instance.id.as_str(), "InstanceProfile"])?;
        self.add_resource(
            profile.clone(),
            "AWS::IAM::InstanceProfile",
            json!({ "Roles": [reference(&role)] }),
            Vec::new(),
        );

        let image_id = self.image_id(&instance.machine_image)?;
        let logical_id = self.ids.claim(&[instance.id.as_str()])?;
        self.add_resource(
            logical_id.clone(),
            "AWS::EC2::Instance",
            json!({
                "AvailabilityZone": availability_zone(subnet.zone_index),
                "IamInstanceProfile": reference(&profile),
                "ImageId": image_id,
                "InstanceType": instance.instance_type.to_string(),
                "KeyName": instance.key_name.as_str(),
                "SecurityGroupIds": [get_att(&group, "GroupId")],
                "SubnetId": reference(&subnet.logical_id),
                "Tags": name_tag(&instance.instance_name),
                "UserData": base64(instance.user_data.render()),
            }),
            vec![role],
        );
        self.instances.insert(instance.id.clone(), logical_id);
        Ok(())
    }

    /// Resolves the `ImageId` property, adding an SSM-backed parameter the
    /// first time Amazon Linux 2 is requested.
    fn image_id(&mut self, image: &MachineImage) -> Result<Value, TemplateError> {
        match image {
            MachineImage::Ami(id) => Ok(Value::from(id.as_str())),
            MachineImage::AmazonLinux2 => {
                let components = ["SsmParameterValue", AMAZON_LINUX_2_SSM_PARAMETER];
                let mut parameter = logical_id(&components)?;
                // Parameters and resources share one logical ID namespace.
                if !self.template.parameters.contains_key(&parameter) {
                    parameter = self.ids.claim(&components)?;
                    self.template.parameters.insert(
                        parameter.clone(),
                        Parameter {
                            parameter_type: SSM_IMAGE_PARAMETER_TYPE.to_owned(),
                            default: AMAZON_LINUX_2_SSM_PARAMETER.to_owned(),
                        },
                    );
                }
                Ok(reference(&parameter))
            }
        }
    }
}

fn ingress_rule(rule: &IngressRule) -> Value {
    json!({
        "CidrIp": rule.peer.cidr().to_string(),
        "Description": rule.description,
        "FromPort": rule.port.from,
        "IpProtocol": rule.port.protocol.as_str(),
        "ToPort": rule.port.to,
    })
}

/// Allow-all egress, or the placeholder rule EC2 needs to express "no
/// outbound traffic" (an ICMP type/code pair that never matches).
fn egress_rules(allow_all_outbound: bool) -> Value {
    if allow_all_outbound {
        json!([{
            "CidrIp": "0.0.0.0/0",
            "Description": "Allow all outbound traffic by default",
            "IpProtocol": "-1",
        }])
    } else {
        json!([{
            "CidrIp": "255.255.255.255/32",
            "Description": "Disallow all traffic",
            "FromPort": 252,
            "IpProtocol": "icmp",
            "ToPort": 86,
        }])
    }
}
