use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use warden_core::{AppError, AppResult};

use super::{Label, ResourceKind};
use crate::TreeNode;

/// Whether a form creates a new record or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "id", rename_all = "snake_case")]
pub enum FormMode {
    /// Blank form for a new record.
    Creating,
    /// Form bound to the record with this id.
    Editing(i64),
}

impl FormMode {
    /// Returns whether the form creates a record.
    #[must_use]
    pub fn is_creating(&self) -> bool {
        matches!(self, Self::Creating)
    }

    /// Returns the edited record id.
    #[must_use]
    pub fn record_id(&self) -> Option<i64> {
        match self {
            Self::Creating => None,
            Self::Editing(id) => Some(*id),
        }
    }
}

/// One choice in a select or radio editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Submitted value.
    pub value: i64,
    /// Displayed text.
    pub label: String,
}

/// Widget used to edit a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditorKind {
    /// Read-only value display.
    Display,
    /// Single-line text input.
    Text,
    /// Image upload.
    Image {
        /// Upload as soon as a file is picked.
        auto_upload: bool,
    },
    /// Date and time picker.
    DateTime {
        /// Picker format string.
        format: String,
    },
    /// Masked password input.
    Password,
    /// Single choice drop-down.
    Select {
        /// Available choices.
        options: Vec<SelectOption>,
    },
    /// Single choice radio group.
    Radio {
        /// Available choices.
        options: Vec<SelectOption>,
        /// Pre-selected value on create.
        default: Option<i64>,
    },
    /// Checkbox tree.
    Tree {
        /// Flat nodes forming the tree.
        nodes: Vec<TreeNode>,
        /// Whether the tree starts expanded.
        expanded: bool,
        /// Node property used as the title.
        title_column: String,
    },
}

/// Storage location checked by a uniqueness rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UniqueTarget {
    /// Named database connection.
    pub connection: String,
    /// Table holding the column.
    pub table: String,
    /// Column that must be unique.
    pub column: String,
}

/// Constraint checked against a submitted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FieldRule {
    /// Value must be present and non-blank.
    Required,
    /// Character count bounds.
    Length {
        /// Minimum characters.
        min: Option<usize>,
        /// Maximum characters.
        max: Option<usize>,
    },
    /// Date must be strictly after another field's date.
    After {
        /// Compared field.
        field: String,
        /// Message on violation.
        message: String,
    },
    /// Date must be at most one year after another field's date.
    WithinYearOf {
        /// Compared field.
        field: String,
        /// Message on violation.
        message: String,
    },
    /// No other row may hold the same value.
    Unique {
        /// Checked storage location.
        target: UniqueTarget,
        /// Row id ignored by the check, set when editing.
        except: Option<i64>,
    },
    /// Value must equal another field's value.
    Same {
        /// Compared field.
        field: String,
    },
}

impl FieldRule {
    /// Returns the compact rule notation shown to engine developers.
    #[must_use]
    pub fn notation(&self) -> String {
        match self {
            Self::Required => "required".to_owned(),
            Self::Length { min, max } => {
                let mut parts = Vec::new();
                if let Some(min) = min {
                    parts.push(format!("min:{min}"));
                }
                if let Some(max) = max {
                    parts.push(format!("max:{max}"));
                }
                parts.join("|")
            }
            Self::After { field, .. } => format!("after:{field}"),
            Self::WithinYearOf { field, .. } => format!("within_year_of:{field}"),
            Self::Unique { target, except } => {
                let base = format!("unique:{}.{}", target.connection, target.table);
                match except {
                    Some(id) => format!("{base},{},{id}", target.column),
                    None => base,
                }
            }
            Self::Same { field } => format!("same:{field}"),
        }
    }

    fn referenced_field(&self) -> Option<&str> {
        match self {
            Self::After { field, .. } | Self::WithinYearOf { field, .. } | Self::Same { field } => {
                Some(field.as_str())
            }
            _ => None,
        }
    }
}

/// Whether a field can be changed and whether its value is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldMutability {
    /// Editable and submitted.
    Editable,
    /// Locked in the editor but still submitted.
    ReadOnly,
    /// Locked and never submitted.
    Disabled,
    /// Shown as text only.
    Display,
}

impl FieldMutability {
    /// Returns whether the field value takes part in a submission.
    #[must_use]
    pub fn submits(&self) -> bool {
        matches!(self, Self::Editable | Self::ReadOnly)
    }
}

/// How a stored value is presented when an edit form is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValueFormat {
    /// The stored value unchanged.
    #[default]
    Stored,
    /// Always an empty string.
    Blank,
    /// The `id` of the first related record.
    FirstRelationId,
    /// The `id` of every related record.
    RelationIds,
}

impl FieldValueFormat {
    fn apply(&self, stored: Option<&Value>) -> Value {
        match self {
            Self::Stored => stored.cloned().unwrap_or(Value::Null),
            Self::Blank => Value::String(String::new()),
            Self::FirstRelationId => stored
                .and_then(Value::as_array)
                .and_then(|related| related.first())
                .and_then(|first| first.get("id"))
                .cloned()
                .unwrap_or(Value::Null),
            Self::RelationIds => Value::Array(
                stored
                    .and_then(Value::as_array)
                    .map(|related| {
                        related
                            .iter()
                            .filter_map(|record| record.get("id").cloned())
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
        }
    }
}

/// One field of a form declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    name: String,
    label: Label,
    editor: EditorKind,
    rules: Vec<FieldRule>,
    mutability: FieldMutability,
    value_format: FieldValueFormat,
}

impl FormField {
    /// Creates an editable field without rules.
    #[must_use]
    pub fn new(name: impl Into<String>, label: Label, editor: EditorKind) -> Self {
        let mutability = if editor == EditorKind::Display {
            FieldMutability::Display
        } else {
            FieldMutability::Editable
        };

        Self {
            name: name.into(),
            label,
            editor,
            rules: Vec::new(),
            mutability,
            value_format: FieldValueFormat::Stored,
        }
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(self) -> Self {
        self.rule(FieldRule::Required)
    }

    /// Adds character count bounds.
    #[must_use]
    pub fn length(self, min: usize, max: usize) -> Self {
        self.rule(FieldRule::Length {
            min: Some(min),
            max: Some(max),
        })
    }

    /// Locks the field while keeping it in the submission.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.mutability = FieldMutability::ReadOnly;
        self
    }

    /// Locks the field and drops it from the submission.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.mutability = FieldMutability::Disabled;
        self
    }

    /// Sets how the stored value prefills the edit form.
    #[must_use]
    pub fn value_format(mut self, value_format: FieldValueFormat) -> Self {
        self.value_format = value_format;
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Returns the editor kind.
    #[must_use]
    pub fn editor(&self) -> &EditorKind {
        &self.editor
    }

    /// Returns the declared rules.
    #[must_use]
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Returns the mutability.
    #[must_use]
    pub fn mutability(&self) -> FieldMutability {
        self.mutability
    }

    /// Returns whether a value must be submitted.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.rules.contains(&FieldRule::Required)
    }
}

/// Declared create or edit form for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDeclaration {
    resource: ResourceKind,
    mode: FormMode,
    fields: Vec<FormField>,
    ignored: Vec<String>,
    delete_enabled: bool,
}

impl FormDeclaration {
    /// Starts an empty declaration.
    #[must_use]
    pub fn new(resource: ResourceKind, mode: FormMode) -> Self {
        Self {
            resource,
            mode,
            fields: Vec::new(),
            ignored: Vec::new(),
            delete_enabled: true,
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    /// Validates a field submission but never persists it.
    #[must_use]
    pub fn ignore(mut self, field_name: impl Into<String>) -> Self {
        self.ignored.push(field_name.into());
        self
    }

    /// Hides the delete button.
    #[must_use]
    pub fn disable_delete(mut self) -> Self {
        self.delete_enabled = false;
        self
    }

    /// Checks field names are unique and cross-field rules point at declared fields.
    pub fn build(self) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name()) {
                return Err(AppError::Validation(format!(
                    "duplicate form field '{}'",
                    field.name()
                )));
            }
        }

        for field in &self.fields {
            for referenced in field.rules().iter().filter_map(FieldRule::referenced_field) {
                if !seen.contains(referenced) {
                    return Err(AppError::Validation(format!(
                        "field '{}' references undeclared field '{referenced}'",
                        field.name()
                    )));
                }
            }
        }

        for ignored in &self.ignored {
            if !seen.contains(ignored.as_str()) {
                return Err(AppError::Validation(format!(
                    "ignored field '{ignored}' is not declared"
                )));
            }
        }

        Ok(self)
    }

    /// Returns the resource.
    #[must_use]
    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    /// Returns the form mode.
    #[must_use]
    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Returns the fields in display order.
    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Returns a field by name.
    #[must_use]
    pub fn field_named(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Returns the validated-but-not-persisted field names.
    #[must_use]
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Returns whether a field is validated but not persisted.
    #[must_use]
    pub fn is_ignored(&self, field_name: &str) -> bool {
        self.ignored.iter().any(|ignored| ignored == field_name)
    }

    /// Returns whether the delete button is shown.
    #[must_use]
    pub fn delete_enabled(&self) -> bool {
        self.delete_enabled
    }

    /// Builds initial editor values from a stored record.
    #[must_use]
    pub fn prefill(&self, record: &Map<String, Value>) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|field| {
                (
                    field.name().to_owned(),
                    field.value_format.apply(record.get(field.name())),
                )
            })
            .collect()
    }
}
