//! Builder session.
//!
//! A [`FormBuilder`] owns the tree being edited together with the form's
//! identifier and display name. Every edit is applied to a copy of the
//! current snapshot, which replaces it only if the edit succeeds.

use serde_json::Value;

use crate::codec::{export_document, DocumentHeader, Importer, WireDiv};
use crate::config::BuilderConfig;
use crate::error::{ImportError, SubmitError, TreeError};
use crate::model::{
    seeded_group, Attribute, Field, FormTree, Group, IdGenerator, Node, NodeKind, Path, TreeEdit,
};
use crate::record::{FormRecord, FormSubmission};
use crate::validate::validate_submission;

/// Where the session's record came from.
#[derive(Debug, Clone, PartialEq)]
enum Origin {
    New,
    Edit {
        id: Option<Value>,
        original_identifier: String,
    },
    Copy,
}

/// An editing session over one form.
pub struct FormBuilder {
    config: BuilderConfig,
    ids: Box<dyn IdGenerator>,
    tree: FormTree,
    form_identifier: String,
    form_display_name: String,
    origin: Origin,
    /// Header fields carried over from an opened document.
    table_manager_id: i64,
    document_name: Option<String>,
    import_diagnostics: Vec<ImportError>,
}

impl FormBuilder {
    /// Starts a new, empty record.
    pub fn new(config: BuilderConfig) -> Self {
        let mut ids = config.id_generator();
        let tree = FormTree::new_record(ids.as_mut());
        Self {
            config,
            ids,
            tree,
            form_identifier: String::new(),
            form_display_name: String::new(),
            origin: Origin::New,
            table_manager_id: 0,
            document_name: None,
            import_diagnostics: Vec::new(),
        }
    }

    /// Opens an existing record for editing, or as a copy when the record
    /// says so.
    pub fn open(record: &FormRecord, config: BuilderConfig) -> Self {
        let mut builder = Self::new(config);

        if record.is_copy {
            builder.origin = Origin::Copy;
        } else {
            builder.form_identifier = record.identifier().to_string();
            builder.form_display_name = record.display_name().to_string();
            builder.origin = Origin::Edit {
                id: record.id.clone(),
                original_identifier: record.identifier().to_string(),
            };
        }

        let Some(document) = record.document() else {
            tracing::warn!("record {:?} has no usable document, starting from a new tree", record.id);
            return builder;
        };
        builder.table_manager_id = document.table_manager_id();
        builder.document_name = document.name();

        let imported = Importer::new(builder.ids.as_mut())
            .with_max_depth(builder.config.max_import_depth)
            .import_document(document.as_value());
        builder.import_diagnostics = imported.diagnostics;
        if imported.tree.is_empty() {
            tracing::warn!(
                "record {:?} imported no nodes ({} diagnostics), starting from a new tree",
                record.id,
                builder.import_diagnostics.len()
            );
        } else {
            builder.tree = imported.tree;
        }
        tracing::info!(
            "opened record {:?} with {} fields{}",
            record.id,
            builder.tree.field_count(),
            if record.is_copy { " as a copy" } else { "" }
        );
        builder
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// The current tree.
    pub fn tree(&self) -> &FormTree {
        &self.tree
    }

    /// A snapshot of the current tree that later edits will not affect.
    pub fn snapshot(&self) -> FormTree {
        self.tree.clone()
    }

    pub fn form_identifier(&self) -> &str {
        &self.form_identifier
    }

    pub fn form_display_name(&self) -> &str {
        &self.form_display_name
    }

    pub fn is_copy(&self) -> bool {
        self.origin == Origin::Copy
    }

    /// Returns true if this session edits an existing record in place.
    pub fn is_editing(&self) -> bool {
        matches!(self.origin, Origin::Edit { .. })
    }

    /// Diagnostics from importing the opened record.
    pub fn import_diagnostics(&self) -> &[ImportError] {
        &self.import_diagnostics
    }

    // =========================================================================
    // EDITS
    // =========================================================================

    /// Appends an empty field to the group at `parent` (or the root).
    pub fn add_field(&mut self, parent: &Path) -> Result<Path, TreeError> {
        let field = Field::new(self.ids.next_id());
        self.insert(parent, field.into())
    }

    /// Appends a new group to the group at `parent` (or the root).
    pub fn add_group(&mut self, parent: &Path) -> Result<Path, TreeError> {
        let group = if self.config.seed_new_groups {
            seeded_group(self.ids.as_mut())
        } else {
            Group::new(self.ids.next_id())
        };
        self.insert(parent, group.into())
    }

    /// Removes the node at `path` and returns it.
    pub fn delete(&mut self, path: &Path) -> Result<Node, TreeError> {
        let mut next = self.tree.clone();
        let removed = next.delete(path)?;
        self.tree = next;
        Ok(removed)
    }

    pub fn set_attribute(&mut self, path: &Path, name: &str, value: &str) -> Result<(), TreeError> {
        self.apply(TreeEdit::SetAttribute {
            path: path.clone(),
            attribute: name.to_string(),
            value: value.to_string(),
        })
    }

    /// Stores a validation rule on the field at `path`.
    ///
    /// Anything other than a field at `path` is `NotFound`.
    pub fn set_validation_rule(&mut self, path: &Path, rule: &str) -> Result<(), TreeError> {
        match self.tree.resolve(path) {
            Ok(node) if node.kind() == NodeKind::Field => {}
            _ => {
                tracing::warn!("no field at path {} for validation rule", path);
                return Err(TreeError::NotFound { path: path.clone() });
            }
        }
        self.set_attribute(path, Attribute::ValidationRule.name(), rule)
    }

    pub fn set_form_identifier(&mut self, identifier: impl Into<String>) {
        self.form_identifier = identifier.into();
    }

    pub fn set_form_display_name(&mut self, display_name: impl Into<String>) {
        self.form_display_name = display_name.into();
    }

    /// Applies an arbitrary edit.
    pub fn apply(&mut self, edit: TreeEdit) -> Result<(), TreeError> {
        match edit {
            TreeEdit::Insert { parent, node } => self.insert(&parent, node).map(|_| ()),
            edit => {
                self.tree = self.tree.apply(edit)?;
                Ok(())
            }
        }
    }

    /// Inserts within the import depth limit, so the saved document can be
    /// opened again without losing nodes.
    fn insert(&mut self, parent: &Path, node: Node) -> Result<Path, TreeError> {
        let mut next = self.tree.clone();
        let path = next.insert_with_max_depth(parent, node, self.config.max_import_depth)?;
        self.tree = next;
        Ok(path)
    }

    // =========================================================================
    // OUTPUT
    // =========================================================================

    /// The document as it would be persisted, without record metadata.
    pub fn preview(&self) -> WireDiv {
        export_document(
            &self.tree,
            &DocumentHeader {
                table_manager_id: 0,
                table_name: non_blank(&self.form_identifier),
                display_name: non_blank(&self.form_display_name),
                name: None,
            },
        )
    }

    /// Builds the submission for the persistence collaborator.
    pub fn submit(&self) -> Result<FormSubmission, SubmitError> {
        validate_submission(&self.form_identifier, &self.form_display_name)?;

        let identifier = self.form_identifier.trim().to_string();
        let display_name = self.form_display_name.trim().to_string();
        let header = DocumentHeader {
            table_manager_id: self.table_manager_id,
            table_name: Some(identifier.clone()),
            display_name: Some(display_name.clone()),
            name: self.document_name.clone(),
        };
        let form_json = export_document(&self.tree, &header);

        let (id, original_form_identifier, is_copy) = match &self.origin {
            Origin::New => (None, None, None),
            Origin::Copy => (None, None, Some(true)),
            Origin::Edit {
                id,
                original_identifier,
            } => {
                let renamed = (*original_identifier != identifier).then(|| original_identifier.clone());
                (id.clone(), renamed, None)
            }
        };

        let submission = FormSubmission {
            form_identifier: identifier,
            form_display_name: display_name,
            form_json,
            items_cnt: self.tree.field_count(),
            id,
            original_form_identifier,
            is_copy,
        };
        tracing::info!(
            "submitting form {:?} with {} fields",
            submission.form_identifier,
            submission.items_cnt
        );
        Ok(submission)
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::WireElement;
    use crate::model::NodeId;

    fn record(value: Value) -> FormRecord {
        serde_json::from_value(value).unwrap()
    }

    fn stored_document() -> Value {
        json!({
            "ElmentType": "Div",
            "TableManagerId": 42,
            "TableName": "tbl_sensor",
            "DisplayName": "Sensor Log",
            "DisplayOrder": 0,
            "Name": "sensor",
            "Elements": [{
                "ElmentType": "Div",
                "Name": "Readings",
                "DisplayOrder": 0,
                "Elements": [
                    {"ElmentType": "Item", "ItemId": 7, "Name": "Temp", "Type": "float(1)", "Unit": "C", "DisplayOrder": 0},
                    {"ElmentType": "Item", "ItemId": 9, "Name": "Mode", "Type": "[s]A,B", "DisplayOrder": 1}
                ]
            }]
        })
    }

    #[test]
    fn test_new_record_tree() {
        let builder = FormBuilder::new(BuilderConfig::default());
        let tree = builder.tree();
        assert_eq!(tree.len(), 1);
        let group = tree.roots()[0].as_group().unwrap();
        assert_eq!(group.items.len(), 1);
        assert!(group.items[0].as_field().unwrap().field_name.is_empty());
        assert!(!builder.is_editing());
        assert!(!builder.is_copy());
    }

    #[test]
    fn test_open_for_edit() {
        let builder = FormBuilder::open(
            &record(json!({"id": 3, "dbName": "tbl_sensor", "eFormName": "Sensor Log", "formJson": stored_document()})),
            BuilderConfig::default(),
        );
        assert!(builder.is_editing());
        assert_eq!(builder.form_identifier(), "tbl_sensor");
        assert_eq!(builder.form_display_name(), "Sensor Log");
        assert!(builder.import_diagnostics().is_empty());
        assert_eq!(builder.tree().field_count(), 2);
        let mode = builder.tree().resolve(&Path::from([0, 1])).unwrap().as_field().unwrap();
        assert_eq!(mode.select_options, "A,B");
    }

    #[test]
    fn test_open_string_document() {
        let text = serde_json::to_string(&stored_document()).unwrap();
        let builder = FormBuilder::open(
            &record(json!({"id": 3, "dbName": "t", "eFormName": "T", "formJson": text})),
            BuilderConfig::default(),
        );
        assert_eq!(builder.tree().field_count(), 2);
    }

    #[test]
    fn test_open_invalid_document_resets() {
        let builder = FormBuilder::open(
            &record(json!({"id": 3, "dbName": "t", "eFormName": "T", "formJson": "{not json"})),
            BuilderConfig::default(),
        );
        assert!(builder.tree().same_content(&FormBuilder::new(BuilderConfig::default()).snapshot()));

        let builder = FormBuilder::open(
            &record(json!({"dbName": "t", "formJson": {"ElmentType": "Div", "Elements": [{"ElmentType": "Bogus"}]}})),
            BuilderConfig::default(),
        );
        assert_eq!(builder.tree().len(), 1);
        assert_eq!(builder.import_diagnostics().len(), 1);
    }

    #[test]
    fn test_copy_submission() {
        let builder = FormBuilder::open(
            &record(json!({"id": 3, "dbName": "tbl_sensor", "eFormName": "Sensor Log", "isCopy": true, "formJson": stored_document()})),
            BuilderConfig::default(),
        );
        assert!(builder.is_copy());
        assert_eq!(builder.form_identifier(), "");
        assert_eq!(builder.form_display_name(), "");
        assert_eq!(builder.submit().unwrap_err(), SubmitError::MissingFormIdentifier);

        let mut builder = builder;
        builder.set_form_identifier("tbl_sensor_copy");
        assert_eq!(builder.submit().unwrap_err(), SubmitError::MissingDisplayName);
        builder.set_form_display_name("Sensor Log (copy)");
        let submission = builder.submit().unwrap();
        assert_eq!(submission.id, None);
        assert_eq!(submission.is_copy, Some(true));
        assert_eq!(submission.original_form_identifier, None);
        assert_eq!(submission.items_cnt, 2);
        assert_eq!(submission.form_json.table_manager_id, 42);
        assert_eq!(submission.form_json.name.as_deref(), Some("sensor"));
    }

    #[test]
    fn test_edit_submission_tracks_rename() {
        let mut builder = FormBuilder::open(
            &record(json!({"id": 3, "dbName": "tbl_sensor", "eFormName": "Sensor Log", "formJson": stored_document()})),
            BuilderConfig::default(),
        );
        let unchanged = builder.submit().unwrap();
        assert_eq!(unchanged.id, Some(json!(3)));
        assert_eq!(unchanged.original_form_identifier, None);
        assert_eq!(unchanged.is_copy, None);
        assert!(unchanged.is_update());

        builder.set_form_identifier(" tbl_sensor_v2 ");
        let renamed = builder.submit().unwrap();
        assert_eq!(renamed.form_identifier, "tbl_sensor_v2");
        assert_eq!(renamed.original_form_identifier.as_deref(), Some("tbl_sensor"));
        assert_eq!(renamed.form_json.table_name.as_deref(), Some("tbl_sensor_v2"));
    }

    #[test]
    fn test_edits_and_preview() {
        let mut builder = FormBuilder::new(BuilderConfig::default());
        let field = builder.add_field(&Path::from([0])).unwrap();
        assert_eq!(field, Path::from([0, 1]));
        builder.set_attribute(&field, "fieldName", "Pressure").unwrap();
        builder.set_attribute(&field, "fieldType", "int").unwrap();
        builder.set_validation_rule(&field, "value >= 0").unwrap();

        let group = builder.add_group(&Path::root()).unwrap();
        assert_eq!(group, Path::from([1]));
        assert_eq!(builder.tree().resolve(&group).unwrap().as_group().unwrap().items.len(), 1);

        let preview = builder.preview();
        assert_eq!(preview.table_manager_id, 0);
        assert_eq!(preview.name, None);
        assert_eq!(preview.table_name, None);
        let value = serde_json::to_value(WireElement::Div(preview)).unwrap();
        let item = &value["Elements"][0]["Elements"][1];
        assert_eq!(item["Name"], "Pressure");
        assert_eq!(item["CheckCond"], "value >= 0");
        assert_eq!(item["ItemId"], 2);
    }

    #[test]
    fn test_failed_edits_leave_tree_unchanged() {
        let mut builder = FormBuilder::new(BuilderConfig::default());
        let before = builder.snapshot();

        assert!(matches!(
            builder.add_field(&Path::from([0, 0])),
            Err(TreeError::InvalidParent { .. })
        ));
        assert!(matches!(
            builder.set_validation_rule(&Path::from([0]), "value >= 1"),
            Err(TreeError::NotFound { .. })
        ));
        assert!(matches!(
            builder.set_attribute(&Path::from([0]), "fieldName", "x"),
            Err(TreeError::UnknownAttribute { .. })
        ));
        assert!(matches!(
            builder.delete(&Path::from([4])),
            Err(TreeError::InvalidPath { .. })
        ));
        assert!(builder.tree().same_content(&before));
    }

    #[test]
    fn test_snapshot_isolated_from_later_edits() {
        let mut builder = FormBuilder::new(BuilderConfig::default());
        let snapshot = builder.snapshot();
        builder.delete(&Path::from([0, 0])).unwrap();
        assert_eq!(snapshot.field_count(), 1);
        assert_eq!(builder.tree().field_count(), 0);
    }

    #[test]
    fn test_submit_trims_names() {
        let mut builder = FormBuilder::new(BuilderConfig::default());
        builder.set_form_identifier("  tbl ");
        builder.set_form_display_name(" Sensor Log  ");
        let submission = builder.submit().unwrap();
        assert_eq!(submission.form_identifier, "tbl");
        assert_eq!(submission.form_display_name, "Sensor Log");
        assert_eq!(submission.form_json.display_name.as_deref(), Some("Sensor Log"));
    }

    #[test]
    fn test_nesting_stops_at_import_depth() {
        let config = BuilderConfig {
            max_import_depth: 5,
            ..BuilderConfig::default()
        };
        let mut builder = FormBuilder::new(config);
        // The new record already occupies depth 2.
        let mut parent = Path::from([0]);
        let mut levels = 0;
        while let Ok(group) = builder.add_group(&parent) {
            parent = group;
            levels += 1;
        }
        assert_eq!(levels, 3);
        assert_eq!(builder.tree().depth(), 5);
        assert!(matches!(
            builder.add_group(&parent),
            Err(TreeError::DepthExceeded { max: 5, .. })
        ));
        assert!(matches!(
            builder.apply(TreeEdit::Insert {
                parent: parent.child(0),
                node: Group::new(NodeId::new("extra")).into(),
            }),
            Err(TreeError::DepthExceeded { .. })
        ));

        // The deepest tree the builder allows imports again unchanged.
        let document = serde_json::to_value(WireElement::Div(builder.preview())).unwrap();
        let mut ids = builder.config().id_generator();
        let imported = Importer::new(ids.as_mut())
            .with_max_depth(5)
            .import_document(&document);
        assert!(imported.is_clean());
        assert!(imported.tree.same_content(builder.tree()));
    }

    #[test]
    fn test_packed_select_type_survives_reopen() {
        let mut builder = FormBuilder::new(BuilderConfig::default());
        builder.set_attribute(&Path::from([0, 0]), "fieldType", "[s]A,B").unwrap();
        builder.set_form_identifier("tbl");
        builder.set_form_display_name("Table");
        let payload = builder.submit().unwrap().to_payload().unwrap();

        let reopened = FormBuilder::open(
            &record(json!({"id": 1, "dbName": "tbl", "eFormName": "Table", "formJson": payload["formJson"]})),
            BuilderConfig::default(),
        );
        assert!(reopened.import_diagnostics().is_empty());
        assert!(reopened.tree().same_content(builder.tree()));
        let field = reopened.tree().resolve(&Path::from([0, 0])).unwrap().as_field().unwrap();
        assert_eq!(field.field_type, crate::model::FieldType::Select);
        assert_eq!(field.select_options, "A,B");
    }

    #[test]
    fn test_unseeded_groups() {
        let config = BuilderConfig {
            seed_new_groups: false,
            ..BuilderConfig::default()
        };
        let mut builder = FormBuilder::new(config);
        let group = builder.add_group(&Path::root()).unwrap();
        assert!(builder.tree().resolve(&group).unwrap().as_group().unwrap().items.is_empty());
    }
}
