//! Tree to wire document conversion.
//!
//! Export is a pre-order, left-to-right walk. Every field takes the next
//! `ItemId` from a counter that is shared by the whole walk and starts at 1
//! for each export call. `DisplayOrder` is the position within the
//! immediate parent sequence and restarts at 0 on every level.

use std::sync::Arc;

use crate::codec::wire::{encode_field_type, WireDiv, WireElement, WireItem};
use crate::limits::FIRST_ITEM_ID;
use crate::model::{FormTree, Node};

/// Hands out sequential `ItemId`s during one export pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemIdCounter {
    next: u32,
}

impl ItemIdCounter {
    pub fn new() -> Self {
        Self {
            next: FIRST_ITEM_ID,
        }
    }

    /// Returns the current value and advances.
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        self.next - FIRST_ITEM_ID
    }
}

impl Default for ItemIdCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Metadata of the top-level `Div` that wraps an exported tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentHeader {
    pub table_manager_id: i64,
    /// Persisted table name (the form identifier).
    pub table_name: Option<String>,
    /// Human-readable form name.
    pub display_name: Option<String>,
    pub name: Option<String>,
}

/// Exports the root sequence of `tree` with a fresh counter.
pub fn export_elements(tree: &FormTree) -> Vec<WireElement> {
    let mut counter = ItemIdCounter::new();
    export_sequence(tree.roots(), &mut counter)
}

/// Exports `tree` wrapped in its top-level `Div`.
pub fn export_document(tree: &FormTree, header: &DocumentHeader) -> WireDiv {
    let mut counter = ItemIdCounter::new();
    let elements = export_sequence(tree.roots(), &mut counter);
    tracing::debug!(
        "exported {} top-level elements, {} items",
        elements.len(),
        counter.issued()
    );
    WireDiv {
        table_manager_id: header.table_manager_id,
        elements,
        table_name: header.table_name.clone(),
        display_name: header.display_name.clone(),
        display_order: 0,
        name: header.name.clone(),
    }
}

/// Exports one sequence, continuing the numbering of `counter`.
pub fn export_sequence(nodes: &[Arc<Node>], counter: &mut ItemIdCounter) -> Vec<WireElement> {
    nodes
        .iter()
        .enumerate()
        .map(|(display_order, node)| export_node(node, display_order, counter))
        .collect()
}

fn export_node(node: &Node, display_order: usize, counter: &mut ItemIdCounter) -> WireElement {
    match node {
        Node::Field(field) => WireElement::Item(WireItem {
            item_id: counter.next_id(),
            check_cond: non_empty(&field.validation_rule),
            display_order,
            description: non_empty(&field.description),
            remark: None,
            field_type: encode_field_type(&field.field_type, &field.select_options),
            name: non_empty(&field.field_name),
            unit: non_empty(&field.physical_unit),
        }),
        Node::Group(group) => WireElement::Div(WireDiv {
            table_manager_id: 0,
            elements: export_sequence(&group.items, counter),
            table_name: None,
            display_name: None,
            display_order,
            name: non_empty(&group.group_name),
        }),
    }
}

pub(crate) fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{Field, FieldType, Group, IdGenerator, SequentialIds};

    fn field(ids: &mut SequentialIds, name: &str, ty: FieldType) -> Node {
        let mut f = Field::new(ids.next_id());
        f.field_name = name.to_string();
        f.field_type = ty;
        f.into()
    }

    fn item_ids(elements: &[WireElement], out: &mut Vec<u32>) {
        for element in elements {
            match element {
                WireElement::Item(item) => out.push(item.item_id),
                WireElement::Div(div) => item_ids(&div.elements, out),
            }
        }
    }

    #[test]
    fn test_group_with_field() {
        let mut ids = SequentialIds::new();
        let f1 = field(&mut ids, "F1", FieldType::Int);
        let tree = FormTree::from_nodes(vec![Group::with_items(ids.next_id(), "G1", vec![f1]).into()]);

        let value = serde_json::to_value(export_elements(&tree)).unwrap();
        assert_eq!(
            value,
            json!([{
                "ElmentType": "Div",
                "TableManagerId": 0,
                "TableName": null,
                "DisplayName": null,
                "DisplayOrder": 0,
                "Name": "G1",
                "Elements": [{
                    "ElmentType": "Item",
                    "ItemId": 1,
                    "CheckCond": null,
                    "DisplayOrder": 0,
                    "Description": null,
                    "Remark": null,
                    "Type": "int",
                    "Name": "F1",
                    "Unit": null
                }]
            }])
        );
    }

    #[test]
    fn test_sibling_fields() {
        let mut ids = SequentialIds::new();
        let tree = FormTree::from_nodes(vec![
            field(&mut ids, "F1", FieldType::Unset),
            field(&mut ids, "F2", FieldType::Unset),
        ]);
        let elements = export_elements(&tree);
        let items: Vec<&WireItem> = elements.iter().filter_map(WireElement::as_item).collect();
        assert_eq!(items[0].display_order, 0);
        assert_eq!(items[0].item_id, 1);
        assert_eq!(items[1].display_order, 1);
        assert_eq!(items[1].item_id, 2);
        assert_eq!(items[0].field_type, None);
    }

    #[test]
    fn test_item_ids_preorder_and_display_order_per_level() {
        // F_a, G[F_b, G[F_c], F_d], F_e
        let mut ids = SequentialIds::new();
        let fa = field(&mut ids, "a", FieldType::Int);
        let fb = field(&mut ids, "b", FieldType::Int);
        let fc = field(&mut ids, "c", FieldType::Int);
        let fd = field(&mut ids, "d", FieldType::Int);
        let fe = field(&mut ids, "e", FieldType::Int);
        let inner = Group::with_items(ids.next_id(), "inner", vec![fc]);
        let outer = Group::with_items(ids.next_id(), "outer", vec![fb, inner.into(), fd]);
        let tree = FormTree::from_nodes(vec![fa, outer.into(), fe]);

        let elements = export_elements(&tree);
        let mut seen = Vec::new();
        item_ids(&elements, &mut seen);
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);

        let outer = elements[1].as_div().unwrap();
        assert_eq!(outer.display_order, 1);
        let orders: Vec<usize> = outer.elements.iter().map(WireElement::display_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        let last = outer.elements[2].as_item().unwrap();
        assert_eq!(last.name.as_deref(), Some("d"));
        assert_eq!(last.item_id, 4);
    }

    #[test]
    fn test_independent_exports_restart_numbering() {
        let mut ids = SequentialIds::new();
        let tree = FormTree::from_nodes(vec![field(&mut ids, "F", FieldType::Date)]);
        let first = export_document(&tree, &DocumentHeader::default());
        let second = export_document(&tree, &DocumentHeader::default());
        assert_eq!(first, second);
        assert_eq!(second.elements[0].as_item().unwrap().item_id, 1);
    }

    #[test]
    fn test_select_and_empty_strings() {
        let mut ids = SequentialIds::new();
        let mut select = Field::new(ids.next_id());
        select.field_type = FieldType::Select;
        select.select_options = "A,B,C".to_string();
        let mut stale = Field::new(ids.next_id());
        stale.field_type = FieldType::Int;
        stale.select_options = "ignored".to_string();
        let mut empty_select = Field::new(ids.next_id());
        empty_select.field_type = FieldType::Select;
        let tree = FormTree::from_nodes(vec![select.into(), stale.into(), empty_select.into()]);

        let elements = export_elements(&tree);
        let types: Vec<Option<&str>> = elements
            .iter()
            .map(|e| e.as_item().unwrap().field_type.as_deref())
            .collect();
        assert_eq!(types, vec![Some("[s]A,B,C"), Some("int"), Some("[s]")]);
        let first = elements[0].as_item().unwrap();
        assert_eq!(first.name, None);
        assert_eq!(first.check_cond, None);
        assert_eq!(first.remark, None);
    }

    #[test]
    fn test_document_header() {
        let tree = FormTree::new();
        let header = DocumentHeader {
            table_manager_id: 12,
            table_name: Some("tbl_sensor".to_string()),
            display_name: Some("Sensor Log".to_string()),
            name: None,
        };
        let doc = export_document(&tree, &header);
        let value = serde_json::to_value(WireElement::Div(doc)).unwrap();
        assert_eq!(
            value,
            json!({
                "ElmentType": "Div",
                "TableManagerId": 12,
                "Elements": [],
                "TableName": "tbl_sensor",
                "DisplayName": "Sensor Log",
                "DisplayOrder": 0,
                "Name": null
            })
        );
    }

    #[test]
    fn test_counter() {
        let mut counter = ItemIdCounter::new();
        assert_eq!(counter.issued(), 0);
        assert_eq!(counter.next_id(), 1);
        assert_eq!(counter.next_id(), 2);
        assert_eq!(counter.issued(), 2);
    }
}
