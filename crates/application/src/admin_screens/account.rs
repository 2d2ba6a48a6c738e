use warden_core::AppResult;
use warden_domain::{
    DATETIME_EDITOR_FORMAT, DetailDeclaration, DetailField, DetailWidget, DisplayTransform,
    END_AFTER_START_MESSAGE, EditorKind, FieldRule, FieldValueFormat, FormDeclaration, FormField,
    FormMode, GridColumn, GridDeclaration, GridToolbar, Label, PASSWORD_MAX_LENGTH,
    PASSWORD_MIN_LENGTH, ResourceKind, SelectOption, SortDirection, TreeViewModel,
    WINDOW_WITHIN_YEAR_MESSAGE,
};

use super::{id_field, timestamp_fields};
use crate::{AdminConfig, RoleRecord};

/// Builds the account create or edit form.
///
/// `roles` feeds the role selector, which only appears when the permission
/// feature is enabled. Roles are chosen on create and locked on edit.
pub fn account_form(
    config: &AdminConfig,
    mode: FormMode,
    roles: &[RoleRecord],
) -> AppResult<FormDeclaration> {
    let datetime = || EditorKind::DateTime {
        format: DATETIME_EDITOR_FORMAT.to_owned(),
    };

    let mut password = FormField::new("password", Label::admin("password"), EditorKind::Password)
        .length(PASSWORD_MIN_LENGTH, PASSWORD_MAX_LENGTH);
    password = match mode {
        FormMode::Creating => password.required(),
        FormMode::Editing(_) => password.value_format(FieldValueFormat::Blank),
    };

    let mut form = FormDeclaration::new(ResourceKind::Account, mode)
        .field(id_field())
        .field(
            FormField::new("username", Label::admin("username"), EditorKind::Text)
                .required()
                .rule(FieldRule::Unique {
                    target: config.username_target(),
                    except: mode.record_id(),
                }),
        )
        .field(FormField::new("name", Label::admin("name"), EditorKind::Text).required())
        .field(FormField::new(
            "avatar",
            Label::admin("avatar"),
            EditorKind::Image { auto_upload: true },
        ))
        .field(FormField::new("start_time", Label::admin("start_time"), datetime()).required())
        .field(
            FormField::new("end_time", Label::admin("end_time"), datetime())
                .required()
                .rule(FieldRule::After {
                    field: "start_time".to_owned(),
                    message: END_AFTER_START_MESSAGE.to_owned(),
                })
                .rule(FieldRule::WithinYearOf {
                    field: "start_time".to_owned(),
                    message: WINDOW_WITHIN_YEAR_MESSAGE.to_owned(),
                }),
        )
        .field(password)
        .field(
            FormField::new(
                "password_confirmation",
                Label::admin("password_confirmation"),
                EditorKind::Password,
            )
            .rule(FieldRule::Same {
                field: "password".to_owned(),
            }),
        )
        .ignore("password_confirmation");

    if config.permission_enabled() {
        let selector = FormField::new(
            "roles",
            Label::admin("roles"),
            EditorKind::Select {
                options: roles
                    .iter()
                    .map(|role| SelectOption {
                        value: role.id.as_i64(),
                        label: role.name.clone(),
                    })
                    .collect(),
            },
        )
        .value_format(FieldValueFormat::FirstRelationId);

        form = form.field(match mode {
            FormMode::Creating => selector.read_only().required(),
            FormMode::Editing(_) => selector.disabled(),
        });
    }

    for field in timestamp_fields() {
        form = form.field(field);
    }

    if mode.record_id().is_some_and(|id| {
        config
            .protection()
            .is_protected(ResourceKind::Account, id)
    }) {
        form = form.disable_delete();
    }

    form.build()
}

/// Builds the account list grid.
#[must_use]
pub fn account_grid() -> GridDeclaration {
    GridDeclaration::new(ResourceKind::Account)
        .column(GridColumn::new("id", Label::new("admin.id", "ID")).sortable())
        .column(GridColumn::new("username", Label::admin("username")))
        .column(GridColumn::new("name", Label::admin("name")))
        .column(
            GridColumn::new("roles", Label::admin("roles"))
                .display(DisplayTransform::FirstRelationName),
        )
        .column(
            GridColumn::new("start_time", Label::admin("start_time"))
                .display(DisplayTransform::dashes()),
        )
        .column(
            GridColumn::new("end_time", Label::admin("end_time"))
                .display(DisplayTransform::dashes()),
        )
        .column(GridColumn::new("created_at", Label::admin("created_at")))
        .column(GridColumn::new("updated_at", Label::admin("updated_at")).sortable())
        .order_by("id", SortDirection::Desc)
        .quick_search(["id", "name", "username"])
        .toolbar(GridToolbar {
            quick_edit: true,
            dialog_create: true,
            column_selector: true,
            edit_button: false,
        })
}

/// Builds the account detail view. `permissions` is the checked permission
/// tree and is only shown when the permission feature is enabled.
#[must_use]
pub fn account_detail(
    config: &AdminConfig,
    account_id: i64,
    permissions: Option<TreeViewModel>,
) -> DetailDeclaration {
    let mut detail = DetailDeclaration::new(ResourceKind::Account, account_id)
        .field(DetailField::new("id", Label::new("admin.id", "ID")))
        .field(DetailField::new("username", Label::admin("username")))
        .field(DetailField::new("name", Label::admin("name")))
        .field(DetailField::new("avatar", Label::admin("avatar")).widget(DetailWidget::Image))
        .field(DetailField::new("start_time", Label::admin("start_time")))
        .field(DetailField::new("end_time", Label::admin("end_time")));

    if config.permission_enabled() {
        detail = detail.field(
            DetailField::new("roles", Label::admin("roles"))
                .display(DisplayTransform::RelationNames)
                .widget(DetailWidget::Labels),
        );

        if let Some(tree) = permissions {
            detail = detail.field(
                DetailField::new("permissions", Label::admin("permissions"))
                    .widget(DetailWidget::Tree(tree)),
            );
        }
    }

    detail = detail
        .field(DetailField::new("created_at", Label::admin("created_at")))
        .field(DetailField::new("updated_at", Label::admin("updated_at")));

    if config
        .protection()
        .is_protected(ResourceKind::Account, account_id)
    {
        detail = detail.disable_delete();
    }

    detail
}
