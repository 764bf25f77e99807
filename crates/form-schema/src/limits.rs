//! Limits and wire vocabulary for the form document format.
//!
//! The limits protect the importer against resource exhaustion when a
//! stored document is malformed or hostile.

/// Maximum nesting depth the importer will descend into.
///
/// Subtrees below this depth are dropped with a diagnostic.
pub const MAX_IMPORT_DEPTH: usize = 64;

/// Maximum number of elements accepted in a single import pass.
pub const MAX_IMPORT_ELEMENTS: usize = 100_000;

/// Discriminant key of every wire element.
///
/// The misspelling is part of the backend vocabulary and must not be fixed.
pub const ELEMENT_TYPE_KEY: &str = "ElmentType";

/// Discriminant value for leaf fields.
pub const ELEMENT_TYPE_ITEM: &str = "Item";

/// Discriminant value for groups.
pub const ELEMENT_TYPE_DIV: &str = "Div";

/// Prefix that packs select options into the `Type` string.
pub const SELECT_TYPE_PREFIX: &str = "[s]";

/// First `ItemId` handed out by every export pass.
pub const FIRST_ITEM_ID: u32 = 1;
