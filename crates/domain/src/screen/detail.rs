use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{DisplayTransform, Label, ResourceKind, Transform};
use crate::TreeViewModel;

/// How a detail field is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tree", rename_all = "snake_case")]
pub enum DetailWidget {
    /// Plain escaped text.
    Text,
    /// Image preview of a stored reference.
    Image,
    /// List of badges.
    Labels,
    /// Pre-built checkbox tree rendered unescaped.
    Tree(TreeViewModel),
}

/// One detail view field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailField {
    name: String,
    label: Label,
    transform: Option<DisplayTransform>,
    widget: DetailWidget,
}

impl DetailField {
    /// Creates a text field.
    #[must_use]
    pub fn new(name: impl Into<String>, label: Label) -> Self {
        Self {
            name: name.into(),
            label,
            transform: None,
            widget: DetailWidget::Text,
        }
    }

    /// Applies a display transform to the stored value.
    #[must_use]
    pub fn display(mut self, transform: DisplayTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Selects the widget.
    #[must_use]
    pub fn widget(mut self, widget: DetailWidget) -> Self {
        self.widget = widget;
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

    /// Returns the widget.
    #[must_use]
    pub fn widget_kind(&self) -> &DetailWidget {
        &self.widget
    }
}

/// Declared detail view of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailDeclaration {
    resource: ResourceKind,
    record_id: i64,
    fields: Vec<DetailField>,
    delete_enabled: bool,
}

impl DetailDeclaration {
    /// Starts an empty detail view for a record.
    #[must_use]
    pub fn new(resource: ResourceKind, record_id: i64) -> Self {
        Self {
            resource,
            record_id,
            fields: Vec::new(),
            delete_enabled: true,
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: DetailField) -> Self {
        self.fields.push(field);
        self
    }

    /// Hides the delete button.
    #[must_use]
    pub fn disable_delete(mut self) -> Self {
        self.delete_enabled = false;
        self
    }

    /// Returns the resource.
    #[must_use]
    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    /// Returns the shown record id.
    #[must_use]
    pub fn record_id(&self) -> i64 {
        self.record_id
    }

    /// Returns the fields in display order.
    #[must_use]
    pub fn fields(&self) -> &[DetailField] {
        &self.fields
    }

    /// Returns a field by name.
    #[must_use]
    pub fn field_named(&self, name: &str) -> Option<&DetailField> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Returns whether the delete button is shown.
    #[must_use]
    pub fn delete_enabled(&self) -> bool {
        self.delete_enabled
    }

    /// Renders display values keyed by field name. Tree fields carry their
    /// model in the widget and render as null here.
    #[must_use]
    pub fn render(&self, record: &Map<String, Value>) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|field| {
                let value = match (&field.widget, &field.transform) {
                    (DetailWidget::Tree(_), _) => Value::Null,
                    (_, Some(transform)) => {
                        transform.apply(record.get(field.name()).unwrap_or(&Value::Null))
                    }
                    (_, None) => record.get(field.name()).cloned().unwrap_or(Value::Null),
                };
                (field.name().to_owned(), value)
            })
            .collect()
    }
}
