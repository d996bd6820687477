//! Builders for CloudFormation intrinsic functions.

use serde_json::{Value, json};

/// `{"Ref": logical_id}`.
#[must_use]
pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{"Fn::GetAtt": [logical_id, attribute]}`.
#[must_use]
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// Picks the `index`-th availability zone of the deployment region.
#[must_use]
pub fn availability_zone(index: u8) -> Value {
    json!({ "Fn::Select": [index, { "Fn::GetAZs": "" }] })
}

/// `{"Fn::Base64": value}`.
#[must_use]
pub fn base64(value: impl Into<Value>) -> Value {
    json!({ "Fn::Base64": value.into() })
}

/// `{"Fn::Join": [delimiter, parts]}`.
#[must_use]
pub fn join(delimiter: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [delimiter, parts] })
}

/// Partition-aware ARN of an AWS managed policy.
#[must_use]
pub fn aws_managed_policy_arn(name: &str) -> Value {
    join(
        "",
        vec![
            Value::from("arn:"),
            reference("AWS::Partition"),
            Value::from(format!(":iam::aws:policy/{name}")),
        ],
    )
}

/// A single `Key`/`Value` tag list.
#[must_use]
pub fn name_tag(value: &str) -> Value {
    json!([{ "Key": "Name", "Value": value }])
}
