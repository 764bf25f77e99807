//! Error types for tree editing, importing, submitting and configuration.

use thiserror::Error;

use crate::model::{NodeKind, Path};

/// Errors raised by path-addressed tree operations.
///
/// A failed operation never changes the tree it was applied to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("no node at path {path}")]
    NotFound { path: Path },

    #[error("node at path {path} is not a group")]
    InvalidParent { path: Path },

    #[error("cannot delete at path {path}: parent sequence or index is invalid")]
    InvalidPath { path: Path },

    #[error("{kind} has no attribute {attribute:?}")]
    UnknownAttribute { attribute: String, kind: NodeKind },

    #[error("inserting under path {path} would nest deeper than {max} levels")]
    DepthExceeded { path: Path, max: usize },
}

/// Diagnostics produced while importing a wire document.
///
/// These are the `MalformedWireInput` family. The importer never fails as a
/// whole; it records one of these and skips the offending element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("expected a sequence of elements at {path}, found {found}")]
    NotASequence { path: Path, found: &'static str },

    #[error("element at {path} is not an object")]
    ElementNotObject { path: Path },

    #[error("element at {path} has no ElmentType")]
    MissingElementType { path: Path },

    #[error("element at {path} has unknown ElmentType {element_type:?}")]
    UnknownElementType { path: Path, element_type: String },

    #[error("attribute {attribute} of element at {path} is not a scalar")]
    NonScalarAttribute { path: Path, attribute: &'static str },

    #[error("element at {path} exceeds maximum nesting depth {max}")]
    DepthExceeded { path: Path, max: usize },

    #[error("element limit {max} reached, remaining elements dropped")]
    TooManyElements { max: usize },

    #[error("document is not valid JSON: {0}")]
    InvalidJson(String),
}

/// Errors raised when a form cannot be submitted.
///
/// Submission is never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("form identifier (table name) is required")]
    MissingFormIdentifier,

    #[error("form display name is required")]
    MissingDisplayName,
}

/// Errors raised while loading builder configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
