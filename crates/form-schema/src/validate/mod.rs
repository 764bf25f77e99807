//! Form validation.
//!
//! [`validate_tree`] reports advisory issues with the form's content. They
//! never block a submission. [`validate_submission`] checks the metadata a
//! submission cannot go without.

pub mod rule;

pub use rule::{RuleKind, ValidationRule};

use thiserror::Error;

use crate::error::SubmitError;
use crate::model::{FormTree, Node, Path};

/// An advisory problem found in a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("field at {path} has no name")]
    EmptyFieldName { path: Path },

    #[error("group at {path} has no name")]
    EmptyGroupName { path: Path },

    #[error("group at {path} has no items")]
    EmptyGroup { path: Path },

    #[error("field at {path} has no type")]
    MissingFieldType { path: Path },

    #[error("select field at {path} has no options")]
    EmptySelectOptions { path: Path },

    /// Rules only take effect on `int` and `float(n)` fields.
    #[error("field at {path} has a validation rule but type {field_type:?} is not numeric")]
    RuleOnNonNumericField { path: Path, field_type: String },
}

impl ValidationIssue {
    pub fn path(&self) -> &Path {
        match self {
            ValidationIssue::EmptyFieldName { path }
            | ValidationIssue::EmptyGroupName { path }
            | ValidationIssue::EmptyGroup { path }
            | ValidationIssue::MissingFieldType { path }
            | ValidationIssue::EmptySelectOptions { path }
            | ValidationIssue::RuleOnNonNumericField { path, .. } => path,
        }
    }
}

/// Collects every advisory issue in `tree`, in pre-order.
pub fn validate_tree(tree: &FormTree) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (path, node) in tree.walk() {
        match node {
            Node::Field(field) => {
                if field.field_name.trim().is_empty() {
                    issues.push(ValidationIssue::EmptyFieldName { path: path.clone() });
                }
                if field.field_type.is_unset() {
                    issues.push(ValidationIssue::MissingFieldType { path: path.clone() });
                } else if field.field_type.is_select() && field.select_option_labels().is_empty() {
                    issues.push(ValidationIssue::EmptySelectOptions { path: path.clone() });
                }
                if !field.validation_rule.trim().is_empty() && !field.field_type.is_numeric() {
                    issues.push(ValidationIssue::RuleOnNonNumericField {
                        path,
                        field_type: field.field_type.as_str().to_string(),
                    });
                }
            }
            Node::Group(group) => {
                if group.group_name.trim().is_empty() {
                    issues.push(ValidationIssue::EmptyGroupName { path: path.clone() });
                }
                if group.items.is_empty() {
                    issues.push(ValidationIssue::EmptyGroup { path });
                }
            }
        }
    }
    if !issues.is_empty() {
        tracing::debug!("validation found {} issues", issues.len());
    }
    issues
}

/// Checks that a submission has both an identifier and a display name.
pub fn validate_submission(identifier: &str, display_name: &str) -> Result<(), SubmitError> {
    if identifier.trim().is_empty() {
        tracing::warn!("submit rejected: form identifier is empty");
        return Err(SubmitError::MissingFormIdentifier);
    }
    if display_name.trim().is_empty() {
        tracing::warn!("submit rejected: display name is empty");
        return Err(SubmitError::MissingDisplayName);
    }
    Ok(())
}
