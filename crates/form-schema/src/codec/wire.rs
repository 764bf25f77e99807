//! Wire types of the backend form document.
//!
//! A document is a tree of `Div` (group) and `Item` (field) elements,
//! discriminated by the `ElmentType` key. Keys are PascalCase and empty
//! strings travel as `null`.

use serde::{Deserialize, Serialize};

use crate::limits::SELECT_TYPE_PREFIX;
use crate::model::FieldType;

/// One element of the wire document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ElmentType")]
pub enum WireElement {
    Item(WireItem),
    Div(WireDiv),
}

impl WireElement {
    pub fn display_order(&self) -> usize {
        match self {
            WireElement::Item(item) => item.display_order,
            WireElement::Div(div) => div.display_order,
        }
    }

    pub fn as_item(&self) -> Option<&WireItem> {
        match self {
            WireElement::Item(item) => Some(item),
            WireElement::Div(_) => None,
        }
    }

    pub fn as_div(&self) -> Option<&WireDiv> {
        match self {
            WireElement::Div(div) => Some(div),
            WireElement::Item(_) => None,
        }
    }
}

/// A leaf field on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireItem {
    /// Pre-order sequence number, unique within one export.
    pub item_id: u32,
    pub check_cond: Option<String>,
    /// Position within the immediate parent sequence.
    pub display_order: usize,
    pub description: Option<String>,
    pub remark: Option<String>,
    /// Field type, with select options packed as `[s]a,b,c`.
    #[serde(rename = "Type")]
    pub field_type: Option<String>,
    pub name: Option<String>,
    pub unit: Option<String>,
}

/// A group on the wire. The document root is also a `Div`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireDiv {
    pub table_manager_id: i64,
    pub elements: Vec<WireElement>,
    pub table_name: Option<String>,
    pub display_name: Option<String>,
    pub display_order: usize,
    pub name: Option<String>,
}

/// Packs a field type for the `Type` key.
///
/// Select fields become `[s]` followed by their options, even when there
/// are none. An unset type is `None`.
pub fn encode_field_type(field_type: &FieldType, select_options: &str) -> Option<String> {
    match field_type {
        FieldType::Select => Some(format!("{SELECT_TYPE_PREFIX}{select_options}")),
        FieldType::Unset => None,
        other => Some(other.as_str().to_string()),
    }
}

/// Unpacks a `Type` value into a field type and its select options.
pub fn decode_field_type(wire: &str) -> (FieldType, String) {
    match wire.strip_prefix(SELECT_TYPE_PREFIX) {
        Some(options) => (FieldType::Select, options.to_string()),
        None => (FieldType::parse(wire), String::new()),
    }
}
