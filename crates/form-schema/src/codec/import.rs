//! Wire document to tree conversion.
//!
//! The importer is total: malformed elements are skipped and reported as
//! [`ImportError`] diagnostics, and the rest of the document is still
//! imported. It works on untyped `serde_json::Value`s so that one bad
//! element cannot reject the whole document.

use serde_json::{Map, Value};

use crate::codec::wire::decode_field_type;
use crate::error::ImportError;
use crate::limits::{
    ELEMENT_TYPE_DIV, ELEMENT_TYPE_ITEM, ELEMENT_TYPE_KEY, MAX_IMPORT_DEPTH, MAX_IMPORT_ELEMENTS,
};
use crate::model::{Field, FormTree, Group, IdGenerator, Node, Path};

/// Result of an import pass.
#[derive(Debug, Clone)]
pub struct Imported {
    pub tree: FormTree,
    /// Everything that was skipped or coerced, in document order.
    pub diagnostics: Vec<ImportError>,
}

impl Imported {
    /// Returns true if the document imported without diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Configurable importer. Use [`import_elements`] for the defaults.
pub struct Importer<'a> {
    ids: &'a mut dyn IdGenerator,
    max_depth: usize,
    max_elements: usize,
    seen: usize,
    diagnostics: Vec<ImportError>,
}

impl<'a> Importer<'a> {
    pub fn new(ids: &'a mut dyn IdGenerator) -> Self {
        Self {
            ids,
            max_depth: MAX_IMPORT_DEPTH,
            max_elements: MAX_IMPORT_ELEMENTS,
            seen: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = max_elements;
        self
    }

    /// Imports a sequence of elements.
    pub fn import_elements(mut self, elements: &Value) -> Imported {
        let nodes = self.import_sequence(elements, &Path::root(), 1);
        self.finish(nodes)
    }

    /// Imports the `Elements` of a top-level `Div` document.
    pub fn import_document(mut self, document: &Value) -> Imported {
        let nodes = match document.get("Elements") {
            Some(elements) => self.import_sequence(elements, &Path::root(), 1),
            None => {
                self.report(ImportError::NotASequence {
                    path: Path::root(),
                    found: if document.is_object() {
                        "no Elements"
                    } else {
                        json_kind(document)
                    },
                });
                Vec::new()
            }
        };
        self.finish(nodes)
    }

    fn finish(self, nodes: Vec<Node>) -> Imported {
        let tree = FormTree::from_nodes(nodes);
        tracing::debug!(
            "imported {} top-level nodes ({} fields) with {} diagnostics",
            tree.len(),
            tree.field_count(),
            self.diagnostics.len()
        );
        Imported {
            tree,
            diagnostics: self.diagnostics,
        }
    }

    fn report(&mut self, diagnostic: ImportError) {
        tracing::warn!("import: {}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// `depth` is the path length of the elements in this sequence.
    fn import_sequence(&mut self, value: &Value, base: &Path, depth: usize) -> Vec<Node> {
        let Some(elements) = value.as_array() else {
            self.report(ImportError::NotASequence {
                path: base.clone(),
                found: json_kind(value),
            });
            return Vec::new();
        };

        let mut nodes = Vec::with_capacity(elements.len());
        for (i, element) in elements.iter().enumerate() {
            if self.seen == self.max_elements {
                self.report(ImportError::TooManyElements {
                    max: self.max_elements,
                });
                // Counting past the limit stops further reports.
                self.seen += 1;
            }
            if self.seen > self.max_elements {
                break;
            }
            self.seen += 1;

            if let Some(node) = self.import_element(element, &base.child(i), depth) {
                nodes.push(node);
            }
        }
        nodes
    }

    fn import_element(&mut self, element: &Value, path: &Path, depth: usize) -> Option<Node> {
        let Some(obj) = element.as_object() else {
            self.report(ImportError::ElementNotObject { path: path.clone() });
            return None;
        };

        let element_type = match obj.get(ELEMENT_TYPE_KEY) {
            Some(Value::String(s)) => s.as_str(),
            None | Some(Value::Null) => {
                self.report(ImportError::MissingElementType { path: path.clone() });
                return None;
            }
            Some(other) => {
                self.report(ImportError::UnknownElementType {
                    path: path.clone(),
                    element_type: other.to_string(),
                });
                return None;
            }
        };

        match element_type {
            ELEMENT_TYPE_ITEM => Some(self.import_item(obj, path)),
            ELEMENT_TYPE_DIV => Some(self.import_div(obj, path, depth)),
            unknown => {
                self.report(ImportError::UnknownElementType {
                    path: path.clone(),
                    element_type: unknown.to_string(),
                });
                None
            }
        }
    }

    fn import_item(&mut self, obj: &Map<String, Value>, path: &Path) -> Node {
        let mut field = Field::new(self.ids.next_id());
        field.field_name = self.text(obj, "Name", path);
        field.validation_rule = self.text(obj, "CheckCond", path);
        field.description = self.text(obj, "Description", path);
        field.physical_unit = self.text(obj, "Unit", path);

        let (field_type, select_options) = decode_field_type(&self.text(obj, "Type", path));
        field.field_type = field_type;
        field.select_options = select_options;
        field.into()
    }

    fn import_div(&mut self, obj: &Map<String, Value>, path: &Path, depth: usize) -> Node {
        let id = self.ids.next_id();
        let name = self.text(obj, "Name", path);

        let items = match obj.get("Elements") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(elements)) if elements.is_empty() => Vec::new(),
            Some(_) if depth >= self.max_depth => {
                self.report(ImportError::DepthExceeded {
                    path: path.clone(),
                    max: self.max_depth,
                });
                Vec::new()
            }
            Some(elements) => self.import_sequence(elements, path, depth + 1),
        };

        Group::with_items(id, name, items).into()
    }

    /// Reads a textual attribute; absent and null become the empty string.
    fn text(&mut self, obj: &Map<String, Value>, key: &'static str, path: &Path) -> String {
        match obj.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Array(_) | Value::Object(_)) => {
                self.report(ImportError::NonScalarAttribute {
                    path: path.clone(),
                    attribute: key,
                });
                String::new()
            }
        }
    }
}

/// Imports a sequence of wire elements with default limits.
pub fn import_elements(elements: &Value, ids: &mut dyn IdGenerator) -> Imported {
    Importer::new(ids).import_elements(elements)
}

/// Imports the `Elements` of a top-level `Div` document with default limits.
pub fn import_document(document: &Value, ids: &mut dyn IdGenerator) -> Imported {
    Importer::new(ids).import_document(document)
}

/// Parses JSON text and imports it as a top-level document.
pub fn import_str(json: &str, ids: &mut dyn IdGenerator) -> Imported {
    match serde_json::from_str::<Value>(json) {
        Ok(document) => import_document(&document, ids),
        Err(e) => {
            let diagnostic = ImportError::InvalidJson(e.to_string());
            tracing::warn!("import: {}", diagnostic);
            Imported {
                tree: FormTree::new(),
                diagnostics: vec![diagnostic],
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
