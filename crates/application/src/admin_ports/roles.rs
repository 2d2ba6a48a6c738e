use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::{Map, Value, json};

use warden_core::AppResult;
use warden_domain::{DataScope, RoleId};

use super::accounts::datetime_value;
use super::listing::{ListQuery, Page};

/// Role as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRecord {
    /// Role identifier.
    pub id: RoleId,
    /// Unique role slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Row visibility scope.
    pub data_scope: DataScope,
    /// Granted permission node ids.
    pub permission_ids: Vec<i64>,
    /// Bound menu node ids.
    pub menu_ids: Vec<i64>,
    /// Creation timestamp.
    pub created_at: Option<NaiveDateTime>,
    /// Last update timestamp.
    pub updated_at: Option<NaiveDateTime>,
}

impl RoleRecord {
    /// Returns the record as screen values keyed by field name.
    #[must_use]
    pub fn to_screen_values(&self) -> Map<String, Value> {
        let related = |ids: &[i64]| {
            Value::Array(ids.iter().map(|id| json!({ "id": id })).collect())
        };

        let mut values = Map::new();
        values.insert("id".to_owned(), json!(self.id.as_i64()));
        values.insert("slug".to_owned(), json!(self.slug));
        values.insert("name".to_owned(), json!(self.name));
        values.insert("data_scope".to_owned(), json!(self.data_scope.as_storage()));
        values.insert("permissions".to_owned(), related(&self.permission_ids));
        values.insert("menus".to_owned(), related(&self.menu_ids));
        values.insert("created_at".to_owned(), datetime_value(self.created_at));
        values.insert("updated_at".to_owned(), datetime_value(self.updated_at));
        values
    }
}

/// Role write payload after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDraft {
    /// Unique role slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Row visibility scope.
    pub data_scope: DataScope,
    /// Replacement permission set.
    pub permission_ids: Vec<i64>,
    /// Replacement menu set, or `None` when menu binding is off.
    pub menu_ids: Option<Vec<i64>>,
}

/// Repository port for roles and their grants.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists one page of roles.
    async fn list_roles(&self, query: &ListQuery) -> AppResult<Page<RoleRecord>>;

    /// Lists every role ordered by id, used for select options.
    async fn all_roles(&self) -> AppResult<Vec<RoleRecord>>;

    /// Finds a role with its grants.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleRecord>>;

    /// Returns the distinct permission ids granted to any of the roles.
    async fn permission_ids_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<i64>>;

    /// Creates a role with its grants.
    async fn create_role(&self, draft: RoleDraft) -> AppResult<RoleRecord>;

    /// Updates a role and replaces its grants.
    async fn update_role(&self, role_id: RoleId, draft: RoleDraft) -> AppResult<RoleRecord>;

    /// Deletes a role and its pivot rows.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<()>;
}
