use warden_core::AppResult;
use warden_domain::{
    DataScope, DetailDeclaration, DetailField, DetailWidget, DisplayTransform, EditorKind,
    FieldRule, FieldValueFormat, FormDeclaration, FormField, FormMode, GridColumn,
    GridDeclaration, GridToolbar, Label, ResourceKind, SelectOption, TreeNode, TreeViewModel,
};

use super::{id_field, timestamp_fields};
use crate::AdminConfig;

/// Builds the role create or edit form.
///
/// The menu tree is only declared when roles are bound to menu entries.
/// `stored_slug` is the slug of the edited role, if any.
pub fn role_form(
    config: &AdminConfig,
    mode: FormMode,
    stored_slug: Option<&str>,
    permission_nodes: Vec<TreeNode>,
    menu_nodes: Vec<TreeNode>,
) -> AppResult<FormDeclaration> {
    let mut form = FormDeclaration::new(ResourceKind::Role, mode)
        .field(id_field())
        .field(
            FormField::new("slug", Label::admin("slug"), EditorKind::Text)
                .required()
                .rule(FieldRule::Unique {
                    target: config.slug_target(),
                    except: mode.record_id(),
                }),
        )
        .field(FormField::new("name", Label::admin("name"), EditorKind::Text).required())
        .field(FormField::new(
            "data_scope",
            Label::admin("data_scope"),
            EditorKind::Radio {
                options: DataScope::all()
                    .iter()
                    .map(|scope| SelectOption {
                        value: i64::from(scope.as_storage()),
                        label: scope.option_label().to_owned(),
                    })
                    .collect(),
                default: Some(i64::from(DataScope::default().as_storage())),
            },
        ))
        .field(
            FormField::new(
                "permissions",
                Label::admin("permissions"),
                EditorKind::Tree {
                    nodes: permission_nodes,
                    expanded: true,
                    title_column: "title".to_owned(),
                },
            )
            .value_format(FieldValueFormat::RelationIds),
        );

    if config.role_bind_menu() {
        form = form.field(
            FormField::new(
                "menus",
                Label::new("admin.menu", "Menu"),
                EditorKind::Tree {
                    nodes: menu_nodes,
                    expanded: false,
                    title_column: "title".to_owned(),
                },
            )
            .value_format(FieldValueFormat::RelationIds),
        );
    }

    for field in timestamp_fields() {
        form = form.field(field);
    }

    if mode.record_id().is_some_and(|id| {
        config
            .protection()
            .is_protected_role(id, stored_slug.unwrap_or_default())
    }) {
        form = form.disable_delete();
    }

    form.build()
}

/// Builds the role list grid.
#[must_use]
pub fn role_grid() -> GridDeclaration {
    GridDeclaration::new(ResourceKind::Role)
        .column(GridColumn::new("id", Label::new("admin.id", "ID")).sortable())
        .column(
            GridColumn::new("slug", Label::admin("slug"))
                .display(DisplayTransform::badge("primary")),
        )
        .column(GridColumn::new("name", Label::admin("name")))
        .column(
            GridColumn::new("data_scope", Label::admin("data_scope"))
                .display(DisplayTransform::DataScopeLabel),
        )
        .column(GridColumn::new("created_at", Label::admin("created_at")))
        .column(GridColumn::new("updated_at", Label::admin("updated_at")).sortable())
        .quick_search(["id", "name", "slug"])
        .toolbar(GridToolbar {
            quick_edit: true,
            dialog_create: true,
            column_selector: false,
            edit_button: false,
        })
}

/// Builds the role detail view around a checked permission tree.
#[must_use]
pub fn role_detail(
    config: &AdminConfig,
    role_id: i64,
    slug: &str,
    permissions: TreeViewModel,
) -> DetailDeclaration {
    let mut detail = DetailDeclaration::new(ResourceKind::Role, role_id)
        .field(DetailField::new("id", Label::new("admin.id", "ID")))
        .field(DetailField::new("slug", Label::admin("slug")))
        .field(DetailField::new("name", Label::admin("name")))
        .field(
            DetailField::new("data_scope", Label::admin("data_scope"))
                .display(DisplayTransform::DataScopeLabel),
        )
        .field(
            DetailField::new("permissions", Label::admin("permissions"))
                .widget(DetailWidget::Tree(permissions)),
        )
        .field(DetailField::new("created_at", Label::admin("created_at")))
        .field(DetailField::new("updated_at", Label::admin("updated_at")));

    if config.protection().is_protected_role(role_id, slug) {
        detail = detail.disable_delete();
    }

    detail
}
