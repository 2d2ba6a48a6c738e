use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{DisplayTransform, Label, ResourceKind, Transform};

/// Sort direction for grid ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// Default grid ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    /// Sorted column.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

/// One grid column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridColumn {
    name: String,
    label: Label,
    sortable: bool,
    transform: Option<DisplayTransform>,
}

impl GridColumn {
    /// Creates a plain column.
    #[must_use]
    pub fn new(name: impl Into<String>, label: Label) -> Self {
        Self {
            name: name.into(),
            label,
            sortable: false,
            transform: None,
        }
    }

    /// Allows sorting by this column.
    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Applies a display transform to every cell.
    #[must_use]
    pub fn display(mut self, transform: DisplayTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the header label.
    #[must_use]
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Returns whether the column is sortable.
    #[must_use]
    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    /// Returns the cell transform.
    #[must_use]
    pub fn transform(&self) -> Option<&DisplayTransform> {
        self.transform.as_ref()
    }

    fn render(&self, record: &Map<String, Value>) -> Value {
        let stored = record.get(self.name()).cloned().unwrap_or(Value::Null);
        match &self.transform {
            Some(transform) => transform.apply(&stored),
            None => stored,
        }
    }
}

/// Toolbar and button switches of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridToolbar {
    /// Row quick-edit button in a dialog.
    pub quick_edit: bool,
    /// Create form opens in a dialog.
    pub dialog_create: bool,
    /// Column visibility selector.
    pub column_selector: bool,
    /// Full-page edit button.
    pub edit_button: bool,
}

impl Default for GridToolbar {
    fn default() -> Self {
        Self {
            quick_edit: false,
            dialog_create: false,
            column_selector: false,
            edit_button: true,
        }
    }
}

/// Actions offered on one grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowActions {
    /// Open the detail view.
    pub view: bool,
    /// Open the full-page editor.
    pub edit: bool,
    /// Open the dialog editor.
    pub quick_edit: bool,
    /// Delete the row.
    pub delete: bool,
}

/// Declared list grid for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDeclaration {
    resource: ResourceKind,
    columns: Vec<GridColumn>,
    default_sort: Option<SortOrder>,
    quick_search: Vec<String>,
    toolbar: GridToolbar,
}

impl GridDeclaration {
    /// Starts an empty grid.
    #[must_use]
    pub fn new(resource: ResourceKind) -> Self {
        Self {
            resource,
            columns: Vec::new(),
            default_sort: None,
            quick_search: Vec::new(),
            toolbar: GridToolbar::default(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: GridColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Sets the default ordering.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.default_sort = Some(SortOrder {
            field: field.into(),
            direction,
        });
        self
    }

    /// Restricts quick search to the given fields.
    #[must_use]
    pub fn quick_search<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.quick_search = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the toolbar switches.
    #[must_use]
    pub fn toolbar(mut self, toolbar: GridToolbar) -> Self {
        self.toolbar = toolbar;
        self
    }

    /// Returns the resource.
    #[must_use]
    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    /// Returns the columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[GridColumn] {
        &self.columns
    }

    /// Returns the default ordering.
    #[must_use]
    pub fn default_sort(&self) -> Option<&SortOrder> {
        self.default_sort.as_ref()
    }

    /// Returns the quick-search fields.
    #[must_use]
    pub fn quick_search_fields(&self) -> &[String] {
        &self.quick_search
    }

    /// Returns the toolbar switches.
    #[must_use]
    pub fn toolbar_settings(&self) -> GridToolbar {
        self.toolbar
    }

    /// Returns whether a column may be used for sorting.
    #[must_use]
    pub fn can_sort_by(&self, field: &str) -> bool {
        self.columns
            .iter()
            .any(|column| column.name() == field && column.is_sortable())
    }

    /// Renders one record into display cells keyed by column name.
    #[must_use]
    pub fn render_row(&self, record: &Map<String, Value>) -> Map<String, Value> {
        self.columns
            .iter()
            .map(|column| (column.name().to_owned(), column.render(record)))
            .collect()
    }

    /// Returns the actions for one row; protected rows cannot be deleted.
    #[must_use]
    pub fn row_actions(&self, protected: bool) -> RowActions {
        RowActions {
            view: true,
            edit: self.toolbar.edit_button,
            quick_edit: self.toolbar.quick_edit,
            delete: !protected,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;

    fn account_grid() -> GridDeclaration {
        GridDeclaration::new(ResourceKind::Account)
            .order_by("id", SortDirection::Desc)
            .column(GridColumn::new("id", Label::new("admin.id", "ID")).sortable())
            .column(
                GridColumn::new("roles", Label::admin("roles"))
                    .display(DisplayTransform::FirstRelationName),
            )
            .column(
                GridColumn::new("start_time", Label::admin("start_time"))
                    .display(DisplayTransform::dashes()),
            )
            .quick_search(["id", "name", "username"])
            .toolbar(GridToolbar {
                quick_edit: true,
                dialog_create: true,
                column_selector: true,
                edit_button: false,
            })
    }

    #[test]
    fn render_row_applies_column_transforms() {
        let mut record = Map::new();
        record.insert("id".to_owned(), json!(4));
        record.insert("roles".to_owned(), json!([{ "id": 1, "name": "Administrator" }]));
        record.insert("start_time".to_owned(), json!(null));
        record.insert("password".to_owned(), json!("secret-hash"));

        let row = account_grid().render_row(&record);
        assert_eq!(row.get("id"), Some(&json!(4)));
        assert_eq!(row.get("roles"), Some(&json!("Administrator")));
        assert_eq!(row.get("start_time"), Some(&json!("--")));
        assert!(row.get("password").is_none());
    }

    #[test]
    fn protected_rows_lose_delete_action() {
        let grid = account_grid();
        assert!(!grid.row_actions(true).delete);
        assert!(grid.row_actions(false).delete);
        assert!(!grid.row_actions(false).edit);
        assert!(grid.row_actions(false).quick_edit);
    }

    #[test]
    fn only_sortable_columns_can_be_sorted() {
        let grid = account_grid();
        assert!(grid.can_sort_by("id"));
        assert!(!grid.can_sort_by("roles"));
        assert!(!grid.can_sort_by("password"));
    }
}
