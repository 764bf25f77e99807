//! Form records exchanged with the persistence collaborator.
//!
//! A [`FormRecord`] is what the collaborator hands over when an existing
//! form is opened. A [`FormSubmission`] is what the builder hands back on
//! save. Neither type performs any I/O.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::codec::{WireDiv, WireElement};

/// A stored form as delivered by the backend.
///
/// The backend uses two spellings for the identifier and display name;
/// both are accepted and the `dbName`/`eFormName` spelling wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormRecord {
    /// Backend record id, present only for existing records.
    pub id: Option<Value>,
    pub form_identifier: Option<String>,
    pub db_name: Option<String>,
    pub form_display_name: Option<String>,
    pub e_form_name: Option<String>,
    /// The wire document, either as an object or as JSON text.
    pub form_json: Option<Value>,
    /// Open as a new record seeded from this one.
    pub is_copy: bool,
    /// Editor mode flag of the backend. Carried through untouched; the
    /// builder does not read it.
    pub mode: Option<i64>,
}

impl FormRecord {
    /// Persisted table name, trimmed.
    pub fn identifier(&self) -> &str {
        self.db_name
            .as_deref()
            .or(self.form_identifier.as_deref())
            .unwrap_or("")
            .trim()
    }

    pub fn display_name(&self) -> &str {
        self.e_form_name
            .as_deref()
            .or(self.form_display_name.as_deref())
            .unwrap_or("")
    }

    /// The wire document, decoded from JSON text if necessary.
    ///
    /// Returns `None` (and logs why) when the document is absent or unusable.
    pub fn document(&self) -> Option<StoredDocument> {
        let value = match self.form_json.as_ref()? {
            Value::Null => return None,
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!("failed to parse formJson of record {:?}: {}", self.id, e);
                    return None;
                }
            },
            doc => doc.clone(),
        };
        if !value.is_object() {
            tracing::warn!("formJson of record {:?} is not an object", self.id);
            return None;
        }
        Some(StoredDocument(value))
    }
}

/// The top-level `Div` of a stored record, still untyped so that the
/// importer can report on malformed elements individually.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument(Value);

impl StoredDocument {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// `TableManagerId` of the document, or 0.
    pub fn table_manager_id(&self) -> i64 {
        self.0
            .get("TableManagerId")
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    /// `Name` of the document, if set.
    pub fn name(&self) -> Option<String> {
        self.0
            .get("Name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

/// The payload produced when a form is saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    pub form_identifier: String,
    pub form_display_name: String,
    #[serde(serialize_with = "serialize_document")]
    pub form_json: WireDiv,
    /// Number of fields in the form.
    pub items_cnt: usize,
    /// Record being updated; absent for new records and copies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Identifier before this edit, present only when it changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_form_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_copy: Option<bool>,
}

impl FormSubmission {
    /// Returns true if this updates an existing record rather than creating one.
    pub fn is_update(&self) -> bool {
        self.id.is_some() && self.is_copy != Some(true)
    }

    /// The request body the backend stores, with `formJson` as JSON text.
    pub fn to_payload(&self) -> Result<Value, serde_json::Error> {
        let mut payload = serde_json::to_value(self)?;
        let document = serde_json::to_string(&WireElement::Div(self.form_json.clone()))?;
        if let Some(obj) = payload.as_object_mut() {
            obj.insert("formJson".to_string(), Value::String(document));
        }
        Ok(payload)
    }
}

fn serialize_document<S: Serializer>(document: &WireDiv, serializer: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    #[serde(tag = "ElmentType")]
    enum Tagged<'a> {
        Div(&'a WireDiv),
    }
    Tagged::Div(document).serialize(serializer)
}
