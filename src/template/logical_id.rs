//! Logical identifiers: the keys of the `Resources`, `Parameters`, and
//! `Outputs` maps.
//!
//! CloudFormation accepts only ASCII alphanumerics, at most 255 of them.
//! Construct identifiers are joined component by component with everything
//! else stripped, so `demo-EC2-instance` becomes `demoEC2instance`.

use std::collections::BTreeSet;

use super::TemplateError;

const MAX_LEN: usize = 255;

/// Joins the sanitised components into one logical ID.
///
/// # Errors
///
/// Returns [`TemplateError::LogicalId`] when nothing alphanumeric remains or
/// the result exceeds 255 characters.
pub fn logical_id(components: &[&str]) -> Result<String, TemplateError> {
    let id: String = components
        .iter()
        .flat_map(|component| component.chars())
        .filter(char::is_ascii_alphanumeric)
        .collect();

    if id.is_empty() || id.len() > MAX_LEN {
        return Err(TemplateError::LogicalId(components.join("/")));
    }
    Ok(id)
}

/// Tracks IDs already placed in one template.
#[derive(Debug, Default)]
pub(super) struct LogicalIds {
    used: BTreeSet<String>,
}

impl LogicalIds {
    /// Builds an ID from `components` and reserves it.
    pub(super) fn claim(&mut self, components: &[&str]) -> Result<String, TemplateError> {
        let id = logical_id(components)?;
        if !self.used.insert(id.clone()) {
            return Err(TemplateError::LogicalIdCollision(id));
        }
        Ok(id)
    }
}
