//! Settable node attributes.

use std::fmt;

use crate::model::NodeKind;

/// An editable attribute of a field or group.
///
/// Attribute names are the camelCase names the editor uses. Structural
/// members (`id`, `items`) are not attributes and cannot be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    FieldName,
    ValidationRule,
    Description,
    PhysicalUnit,
    FieldType,
    SelectOptions,
    GroupName,
}

impl Attribute {
    pub const FIELD: [Attribute; 6] = [
        Attribute::FieldName,
        Attribute::ValidationRule,
        Attribute::Description,
        Attribute::PhysicalUnit,
        Attribute::FieldType,
        Attribute::SelectOptions,
    ];

    pub const GROUP: [Attribute; 1] = [Attribute::GroupName];

    /// Looks up an attribute by its editor name.
    pub fn from_name(name: &str) -> Option<Attribute> {
        match name {
            "fieldName" => Some(Attribute::FieldName),
            "validationRule" => Some(Attribute::ValidationRule),
            "description" => Some(Attribute::Description),
            "physicalUnit" => Some(Attribute::PhysicalUnit),
            "fieldType" => Some(Attribute::FieldType),
            "selectOptions" => Some(Attribute::SelectOptions),
            "groupName" => Some(Attribute::GroupName),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Attribute::FieldName => "fieldName",
            Attribute::ValidationRule => "validationRule",
            Attribute::Description => "description",
            Attribute::PhysicalUnit => "physicalUnit",
            Attribute::FieldType => "fieldType",
            Attribute::SelectOptions => "selectOptions",
            Attribute::GroupName => "groupName",
        }
    }

    /// Returns whether this attribute is declared on nodes of `kind`.
    pub fn applies_to(self, kind: NodeKind) -> bool {
        match kind {
            NodeKind::Field => Self::FIELD.contains(&self),
            NodeKind::Group => Self::GROUP.contains(&self),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
