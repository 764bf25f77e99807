//! Conversion between form trees and the backend wire document.
//!
//! - [`import`]: wire elements to tree, total, with diagnostics
//! - [`export`]: tree to wire elements with sequential `ItemId`s
//! - [`wire`]: the serde types and the packed select `Type` encoding

pub mod export;
pub mod import;
pub mod wire;

pub use export::{export_document, export_elements, export_sequence, DocumentHeader, ItemIdCounter};
pub use import::{import_document, import_elements, import_str, Imported, Importer};
pub use wire::{decode_field_type, encode_field_type, WireDiv, WireElement, WireItem};
