use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use warden_application::{
    AccountRecord, DetailScreen, FormScreen, GridRequest, GridRow, GridScreen, RoleRecord,
    RoleSummary,
};
use warden_core::AppError;
use warden_domain::{
    DetailDeclaration, FormDeclaration, FormMode, GridDeclaration, RowActions, SortDirection,
    SortOrder, TreeItem, TreeViewModel, format_datetime,
};

/// Grid listing query string.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/grid-query-params.ts"
)]
pub struct GridQueryParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    #[ts(type = "\"asc\" | \"desc\" | null")]
    pub direction: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl TryFrom<GridQueryParams> for GridRequest {
    type Error = AppError;

    fn try_from(params: GridQueryParams) -> Result<Self, Self::Error> {
        let direction = match params.direction.as_deref().map(str::trim) {
            None | Some("") | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "direction must be 'asc' or 'desc', got '{other}'"
                )));
            }
        };

        let sort = params
            .sort
            .filter(|field| !field.trim().is_empty())
            .map(|field| SortOrder { field, direction });

        Ok(GridRequest {
            search: params.search,
            sort,
            page: params.page,
            per_page: params.per_page,
        })
    }
}

/// Form declaration query string.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-query-params.ts"
)]
pub struct FormQueryParams {
    #[ts(type = "\"create\" | \"edit\" | null")]
    pub mode: Option<String>,
    pub id: Option<i64>,
}

impl TryFrom<FormQueryParams> for FormMode {
    type Error = AppError;

    fn try_from(params: FormQueryParams) -> Result<Self, Self::Error> {
        match (params.mode.as_deref(), params.id) {
            (None | Some("create"), None) => Ok(FormMode::Creating),
            (None | Some("edit"), Some(id)) => Ok(FormMode::Editing(id)),
            (Some("edit"), None) => Err(AppError::Validation(
                "id is required when editing".to_owned(),
            )),
            (Some("create"), Some(_)) => Err(AppError::Validation(
                "id is only accepted when editing".to_owned(),
            )),
            (Some(other), _) => Err(AppError::Validation(format!(
                "mode must be 'create' or 'edit', got '{other}'"
            ))),
        }
    }
}

/// Form declaration with initial values.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/form-screen-response.ts"
)]
pub struct FormScreenResponse {
    #[ts(type = "Record<string, unknown>")]
    pub declaration: FormDeclaration,
    #[ts(type = "Record<string, unknown>")]
    pub values: Map<String, Value>,
}

impl From<FormScreen> for FormScreenResponse {
    fn from(screen: FormScreen) -> Self {
        Self {
            declaration: screen.declaration,
            values: screen.values,
        }
    }
}

/// One rendered grid row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/grid-row-response.ts"
)]
pub struct GridRowResponse {
    pub id: i64,
    #[ts(type = "Record<string, unknown>")]
    pub cells: Map<String, Value>,
    #[ts(type = "{ view: boolean, edit: boolean, quick_edit: boolean, delete: boolean }")]
    pub actions: RowActions,
}

impl From<GridRow> for GridRowResponse {
    fn from(row: GridRow) -> Self {
        Self {
            id: row.id,
            cells: row.cells,
            actions: row.actions,
        }
    }
}

/// Grid declaration with one page of rows.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/grid-screen-response.ts"
)]
pub struct GridScreenResponse {
    #[ts(type = "Record<string, unknown>")]
    pub declaration: GridDeclaration,
    pub rows: Vec<GridRowResponse>,
    #[ts(type = "number")]
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl From<GridScreen> for GridScreenResponse {
    fn from(screen: GridScreen) -> Self {
        Self {
            declaration: screen.declaration,
            rows: screen.rows.into_iter().map(GridRowResponse::from).collect(),
            total: screen.total,
            page: screen.page,
            per_page: screen.per_page,
        }
    }
}

/// Detail declaration with display values.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/detail-screen-response.ts"
)]
pub struct DetailScreenResponse {
    #[ts(type = "Record<string, unknown>")]
    pub declaration: DetailDeclaration,
    #[ts(type = "Record<string, unknown>")]
    pub values: Map<String, Value>,
}

impl From<DetailScreen> for DetailScreenResponse {
    fn from(screen: DetailScreen) -> Self {
        Self {
            declaration: screen.declaration,
            values: screen.values,
        }
    }
}

/// Role reference attached to an account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-summary-response.ts"
)]
pub struct RoleSummaryResponse {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

impl From<RoleSummary> for RoleSummaryResponse {
    fn from(role: RoleSummary) -> Self {
        Self {
            id: role.id.as_i64(),
            slug: role.slug,
            name: role.name,
        }
    }
}

/// Saved administrator account. The password hash is never returned.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/account-response.ts"
)]
pub struct AccountResponse {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub avatar: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub roles: Vec<RoleSummaryResponse>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<AccountRecord> for AccountResponse {
    fn from(account: AccountRecord) -> Self {
        Self {
            id: account.id.as_i64(),
            username: account.username,
            name: account.name,
            avatar: account.avatar,
            start_time: account.start_time.as_ref().map(format_datetime),
            end_time: account.end_time.as_ref().map(format_datetime),
            roles: account
                .roles
                .into_iter()
                .map(RoleSummaryResponse::from)
                .collect(),
            created_at: account.created_at.as_ref().map(format_datetime),
            updated_at: account.updated_at.as_ref().map(format_datetime),
        }
    }
}

/// Saved role with its grants.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub data_scope: i16,
    pub data_scope_label: String,
    pub permission_ids: Vec<i64>,
    pub menu_ids: Vec<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<RoleRecord> for RoleResponse {
    fn from(role: RoleRecord) -> Self {
        Self {
            id: role.id.as_i64(),
            slug: role.slug,
            name: role.name,
            data_scope: role.data_scope.as_storage(),
            data_scope_label: role.data_scope.label().to_owned(),
            permission_ids: role.permission_ids,
            menu_ids: role.menu_ids,
            created_at: role.created_at.as_ref().map(format_datetime),
            updated_at: role.updated_at.as_ref().map(format_datetime),
        }
    }
}

/// Menu tree served from the menu cache.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/menu-response.ts"
)]
pub struct MenuResponse {
    #[ts(type = "Array<{ id: number, title: string, checked: boolean, children: Array<unknown> }>")]
    pub items: Vec<TreeItem>,
}

impl From<TreeViewModel> for MenuResponse {
    fn from(tree: TreeViewModel) -> Self {
        Self {
            items: tree.roots().to_vec(),
        }
    }
}
