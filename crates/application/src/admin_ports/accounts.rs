use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::{Map, Value, json};

use warden_core::AppResult;
use warden_domain::{AccountId, RoleId, format_datetime};

use super::listing::{ListQuery, Page};

/// Role reference attached to an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSummary {
    /// Role identifier.
    pub id: RoleId,
    /// Role slug.
    pub slug: String,
    /// Role display name.
    pub name: String,
}

/// Administrator account as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    /// Account identifier.
    pub id: AccountId,
    /// Unique sign-in name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Stored avatar reference.
    pub avatar: Option<String>,
    /// Start of the validity window.
    pub start_time: Option<NaiveDateTime>,
    /// End of the validity window.
    pub end_time: Option<NaiveDateTime>,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Assigned roles ordered by assignment.
    pub roles: Vec<RoleSummary>,
    /// Creation timestamp.
    pub created_at: Option<NaiveDateTime>,
    /// Last update timestamp.
    pub updated_at: Option<NaiveDateTime>,
}

impl AccountRecord {
    /// Returns the record as screen values keyed by field name.
    #[must_use]
    pub fn to_screen_values(&self) -> Map<String, Value> {
        let mut values = Map::new();
        values.insert("id".to_owned(), json!(self.id.as_i64()));
        values.insert("username".to_owned(), json!(self.username));
        values.insert("name".to_owned(), json!(self.name));
        values.insert("avatar".to_owned(), json!(self.avatar));
        values.insert("start_time".to_owned(), datetime_value(self.start_time));
        values.insert("end_time".to_owned(), datetime_value(self.end_time));
        values.insert("password".to_owned(), json!(self.password_hash));
        values.insert(
            "roles".to_owned(),
            Value::Array(
                self.roles
                    .iter()
                    .map(|role| {
                        json!({ "id": role.id.as_i64(), "slug": role.slug, "name": role.name })
                    })
                    .collect(),
            ),
        );
        values.insert("created_at".to_owned(), datetime_value(self.created_at));
        values.insert("updated_at".to_owned(), datetime_value(self.updated_at));
        values
    }
}

pub(crate) fn datetime_value(value: Option<NaiveDateTime>) -> Value {
    value
        .map(|value| Value::String(format_datetime(&value)))
        .unwrap_or(Value::Null)
}

/// Account write payload after validation and save hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDraft {
    /// Unique sign-in name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Avatar reference.
    pub avatar: Option<String>,
    /// Start of the validity window.
    pub start_time: NaiveDateTime,
    /// End of the validity window.
    pub end_time: NaiveDateTime,
    /// New password hash, or `None` to keep the stored one.
    pub password_hash: Option<String>,
    /// Replacement role set, or `None` to keep the stored one.
    pub role_ids: Option<Vec<RoleId>>,
}

/// Repository port for administrator accounts.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Lists one page of accounts.
    async fn list_accounts(&self, query: &ListQuery) -> AppResult<Page<AccountRecord>>;

    /// Finds an account with its roles.
    async fn find_account(&self, account_id: AccountId) -> AppResult<Option<AccountRecord>>;

    /// Creates an account. The draft must carry a password hash.
    async fn create_account(&self, draft: AccountDraft) -> AppResult<AccountRecord>;

    /// Updates an account.
    async fn update_account(
        &self,
        account_id: AccountId,
        draft: AccountDraft,
    ) -> AppResult<AccountRecord>;

    /// Deletes an account and its role assignments.
    async fn delete_account(&self, account_id: AccountId) -> AppResult<()>;
}
