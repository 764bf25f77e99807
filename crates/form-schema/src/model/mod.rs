//! Data model types for form definitions.
//!
//! This module contains the in-memory representation of a form:
//! - Identifiers (session-local node ids)
//! - Nodes (fields and groups) and their editable attributes
//! - Paths (index addressing from the root)
//! - Trees (path-addressed editing over copy-on-write snapshots)

pub mod attribute;
pub mod id;
pub mod node;
pub mod path;
pub mod tree;

pub use attribute::Attribute;
pub use id::{IdGenerator, NodeId, SequentialIds, UuidIds};
pub use node::{Field, FieldType, Group, Node, NodeKind};
pub use path::Path;
pub use tree::{seeded_group, FormTree, TreeEdit, Walk};
