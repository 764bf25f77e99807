//! Field and group nodes of a form tree.

use std::fmt;
use std::sync::Arc;

use crate::error::TreeError;
use crate::limits::SELECT_TYPE_PREFIX;
use crate::model::{Attribute, NodeId};

/// Storage type of a field (the `Type` column of the backend schema).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    /// No type chosen yet.
    #[default]
    Unset,
    /// 32-bit integer.
    Int,
    /// Decimal with one fractional digit.
    Float1,
    /// Decimal with two fractional digits.
    Float2,
    /// Decimal with three fractional digits.
    Float3,
    /// Fixed-width string of 32 characters.
    NChar32,
    Date,
    Time,
    /// Drop-down whose options live in the field's `select_options`.
    Select,
    /// Any type string outside the known vocabulary, kept verbatim.
    Other(String),
}

impl FieldType {
    /// The types offered by the editor, in display order.
    pub const KNOWN: [FieldType; 8] = [
        FieldType::Int,
        FieldType::Float1,
        FieldType::Float2,
        FieldType::Float3,
        FieldType::NChar32,
        FieldType::Date,
        FieldType::Time,
        FieldType::Select,
    ];

    /// Parses a type name. The empty string is `Unset`.
    ///
    /// A packed select type such as `[s]A,B` parses as `Select`; its options
    /// are not part of the type.
    pub fn parse(s: &str) -> FieldType {
        match s {
            "" => FieldType::Unset,
            packed if packed.starts_with(SELECT_TYPE_PREFIX) => FieldType::Select,
            "int" => FieldType::Int,
            "float(1)" => FieldType::Float1,
            "float(2)" => FieldType::Float2,
            "float(3)" => FieldType::Float3,
            "nchar(32)" => FieldType::NChar32,
            "date" => FieldType::Date,
            "time" => FieldType::Time,
            "select" => FieldType::Select,
            other => FieldType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Unset => "",
            FieldType::Int => "int",
            FieldType::Float1 => "float(1)",
            FieldType::Float2 => "float(2)",
            FieldType::Float3 => "float(3)",
            FieldType::NChar32 => "nchar(32)",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Select => "select",
            FieldType::Other(s) => s,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, FieldType::Unset)
    }

    pub fn is_select(&self) -> bool {
        matches!(self, FieldType::Select)
    }

    /// Returns whether validation rules take effect on this type.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Int | FieldType::Float1 | FieldType::Float2 | FieldType::Float3
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for FieldType {
    fn from(s: &str) -> Self {
        FieldType::parse(s)
    }
}

/// Discriminant of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Field,
    Group,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Field => f.write_str("field"),
            NodeKind::Group => f.write_str("group"),
        }
    }
}

/// A leaf of the form tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub id: NodeId,
    pub field_name: String,
    /// Boolean expression over `value`, or empty for no rule. Never evaluated here.
    pub validation_rule: String,
    pub description: String,
    pub physical_unit: String,
    pub field_type: FieldType,
    /// Comma-separated option labels, meaningful only for `FieldType::Select`.
    pub select_options: String,
}

impl Field {
    /// Creates a field with every attribute empty.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            field_name: String::new(),
            validation_rule: String::new(),
            description: String::new(),
            physical_unit: String::new(),
            field_type: FieldType::Unset,
            select_options: String::new(),
        }
    }

    /// The select options as they take effect: empty unless the field is a select.
    pub fn effective_select_options(&self) -> &str {
        if self.field_type.is_select() {
            &self.select_options
        } else {
            ""
        }
    }

    /// Individual option labels, trimmed, with empty entries dropped.
    pub fn select_option_labels(&self) -> Vec<&str> {
        self.effective_select_options()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Compares every user-visible attribute, ignoring `id`.
    pub fn same_content(&self, other: &Field) -> bool {
        self.field_name == other.field_name
            && self.validation_rule == other.validation_rule
            && self.description == other.description
            && self.physical_unit == other.physical_unit
            && self.field_type == other.field_type
            && self.effective_select_options() == other.effective_select_options()
    }
}

/// An interior node holding an ordered sequence of children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: NodeId,
    pub group_name: String,
    /// Children, shared between snapshots until one of them is edited.
    pub items: Vec<Arc<Node>>,
}

impl Group {
    /// Creates an unnamed, empty group.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            group_name: String::new(),
            items: Vec::new(),
        }
    }

    pub fn with_items(id: NodeId, group_name: impl Into<String>, items: Vec<Node>) -> Self {
        Self {
            id,
            group_name: group_name.into(),
            items: items.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn items(&self) -> impl ExactSizeIterator<Item = &Node> {
        self.items.iter().map(|n| n.as_ref())
    }

    /// Compares name, nesting and sibling order recursively, ignoring ids.
    pub fn same_content(&self, other: &Group) -> bool {
        self.group_name == other.group_name && same_sequence(&self.items, &other.items)
    }
}

/// A node of the form tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Field(Field),
    Group(Group),
}

impl Node {
    pub fn id(&self) -> &NodeId {
        match self {
            Node::Field(f) => &f.id,
            Node::Group(g) => &g.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Field(_) => NodeKind::Field,
            Node::Group(_) => NodeKind::Group,
        }
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Node::Field(f) => Some(f),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(g) => Some(g),
            Node::Field(_) => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            Node::Group(g) => Some(g),
            Node::Field(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Node::Group(_))
    }

    /// Number of fields in this subtree.
    pub fn field_count(&self) -> usize {
        match self {
            Node::Field(_) => 1,
            Node::Group(g) => g.items().map(Node::field_count).sum(),
        }
    }

    /// Resolves an attribute name against this node's variant.
    pub fn check_attribute(&self, name: &str) -> Result<Attribute, TreeError> {
        Attribute::from_name(name)
            .filter(|attr| attr.applies_to(self.kind()))
            .ok_or_else(|| TreeError::UnknownAttribute {
                attribute: name.to_string(),
                kind: self.kind(),
            })
    }

    /// Reads an attribute, or `None` if it is not declared for this variant.
    pub fn attribute(&self, attribute: Attribute) -> Option<&str> {
        match (self, attribute) {
            (Node::Field(f), Attribute::FieldName) => Some(f.field_name.as_str()),
            (Node::Field(f), Attribute::ValidationRule) => Some(f.validation_rule.as_str()),
            (Node::Field(f), Attribute::Description) => Some(f.description.as_str()),
            (Node::Field(f), Attribute::PhysicalUnit) => Some(f.physical_unit.as_str()),
            (Node::Field(f), Attribute::FieldType) => Some(f.field_type.as_str()),
            (Node::Field(f), Attribute::SelectOptions) => Some(f.select_options.as_str()),
            (Node::Group(g), Attribute::GroupName) => Some(g.group_name.as_str()),
            _ => None,
        }
    }

    /// Replaces an attribute value in place.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), TreeError> {
        let attribute = self.check_attribute(name)?;
        self.set(attribute, value);
        Ok(())
    }

    /// Sets an attribute already known to apply to this variant.
    pub(crate) fn set(&mut self, attribute: Attribute, value: &str) {
        match (self, attribute) {
            (Node::Field(f), Attribute::FieldName) => f.field_name = value.to_string(),
            (Node::Field(f), Attribute::ValidationRule) => f.validation_rule = value.to_string(),
            (Node::Field(f), Attribute::Description) => f.description = value.to_string(),
            (Node::Field(f), Attribute::PhysicalUnit) => f.physical_unit = value.to_string(),
            (Node::Field(f), Attribute::FieldType) => match value.strip_prefix(SELECT_TYPE_PREFIX) {
                Some(options) => {
                    f.field_type = FieldType::Select;
                    f.select_options = options.to_string();
                }
                None => f.field_type = FieldType::parse(value),
            },
            (Node::Field(f), Attribute::SelectOptions) => f.select_options = value.to_string(),
            (Node::Group(g), Attribute::GroupName) => g.group_name = value.to_string(),
            // Unreachable after check_attribute; leave the node unchanged.
            _ => {}
        }
    }

    /// Number of levels in this subtree: 1 for a field or an empty group.
    pub fn height(&self) -> usize {
        match self {
            Node::Field(_) => 1,
            Node::Group(g) => 1 + g.items().map(Node::height).max().unwrap_or(0),
        }
    }

    /// Structural equivalence ignoring ids.
    pub fn same_content(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Field(a), Node::Field(b)) => a.same_content(b),
            (Node::Group(a), Node::Group(b)) => a.same_content(b),
            _ => false,
        }
    }
}

impl From<Field> for Node {
    fn from(f: Field) -> Self {
        Node::Field(f)
    }
}

impl From<Group> for Node {
    fn from(g: Group) -> Self {
        Node::Group(g)
    }
}

pub(crate) fn same_sequence(a: &[Arc<Node>], b: &[Arc<Node>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_content(y))
}
