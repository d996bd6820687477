//! IAM role rendering.

use serde_json::{Value, json};

use super::intrinsics::aws_managed_policy_arn;
use super::{Renderer, TemplateError};
use crate::stack::resources::Role;

const POLICY_VERSION: &str = "2012-10-17";

impl Renderer<'_> {
    pub(super) fn render_role(&mut self, role: &Role) -> Result<(), TemplateError> {
        let logical_id = self.ids.claim(&[role.id.as_str()])?;
        let policy_arns: Vec<Value> = role
            .managed_policies
            .iter()
            .map(|policy| aws_managed_policy_arn(&policy.name))
            .collect();

        self.add_resource(
            logical_id.clone(),
            "AWS::IAM::Role",
            json!({
                "AssumeRolePolicyDocument": trust_policy(&role.assumed_by),
                "Description": role.description,
                "ManagedPolicyArns": policy_arns,
                "RoleName": role.role_name,
            }),
            Vec::new(),
        );
        self.roles.insert(role.id.clone(), logical_id);
        Ok(())
    }
}

/// Trust policy letting exactly one service principal assume the role.
fn trust_policy(service: &str) -> Value {
    json!({
        "Statement": [{
            "Action": "sts:AssumeRole",
            "Effect": "Allow",
            "Principal": { "Service": service },
        }],
        "Version": POLICY_VERSION,
    })
}
