//! form-schema: form-definition builder core.
//!
//! This crate holds the editable model of a data-entry form and converts it
//! to and from the document the backend stores.
//!
//! # Overview
//!
//! A form is an ordered tree of:
//! - **Fields**: leaves with a name, a storage type, an optional
//!   validation rule, a description, a unit and select options
//! - **Groups**: named containers of fields and further groups
//!
//! Nodes are addressed by [`Path`]s of child indices from the root. Every
//! edit produces a new snapshot that shares unchanged subtrees with the
//! previous one.
//!
//! # Quick Start
//!
//! ```rust
//! use form_schema::{BuilderConfig, FormBuilder, Path};
//!
//! let mut builder = FormBuilder::new(BuilderConfig::default());
//!
//! // The new record has one group holding one empty field.
//! let field = Path::from([0, 0]);
//! builder.set_attribute(&field, "fieldName", "Temperature").unwrap();
//! builder.set_attribute(&field, "fieldType", "float(1)").unwrap();
//! builder.set_validation_rule(&field, "value >= -40 && value <= 85").unwrap();
//!
//! builder.set_form_identifier("tbl_sensor");
//! builder.set_form_display_name("Sensor Log");
//!
//! let submission = builder.submit().unwrap();
//! assert_eq!(submission.items_cnt, 1);
//! assert_eq!(submission.form_json.elements[0].as_div().unwrap().elements.len(), 1);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Tree, nodes, paths, attributes and node ids
//! - [`codec`]: Import from and export to the wire document
//! - [`record`]: Records received from and submissions sent to the backend
//! - [`builder`]: Editing session over one form
//! - [`validate`]: Advisory validation and the validation-rule mini-language
//! - [`config`]: Builder configuration
//! - [`error`]: Error types
//! - [`limits`]: Import limits and wire constants
//!
//! # Wire Format
//!
//! Documents are JSON trees of `Div` and `Item` elements discriminated by an
//! `ElmentType` key. Import never fails as a whole: malformed elements are
//! skipped and reported as diagnostics. Export numbers fields with
//! sequential `ItemId`s in pre-order, starting at 1 on every export.

pub mod builder;
pub mod codec;
pub mod config;
pub mod error;
pub mod limits;
pub mod model;
pub mod record;
pub mod validate;

// Re-export commonly used types at crate root
pub use builder::FormBuilder;
pub use codec::{
    export_document, export_elements, import_document, import_elements, import_str,
    DocumentHeader, Imported, Importer, WireDiv, WireElement, WireItem,
};
pub use config::{BuilderConfig, IdStrategy};
pub use error::{ConfigError, ImportError, SubmitError, TreeError};
pub use model::{
    Attribute, Field, FieldType, FormTree, Group, IdGenerator, Node, NodeId, NodeKind, Path,
    SequentialIds, TreeEdit, UuidIds,
};
pub use record::{FormRecord, FormSubmission, StoredDocument};
pub use validate::{validate_submission, validate_tree, RuleKind, ValidationIssue, ValidationRule};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
