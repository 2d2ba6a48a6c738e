//! In-memory accounts, roles and node forests for single-process deployments
//! and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::sync::RwLock;
use warden_application::{
    AccountDraft, AccountRecord, AccountRepository, AdminTables, ListQuery, MenuNodeRepository,
    Page, PermissionNodeRepository, RoleDraft, RoleRecord, RoleRepository, RoleSummary,
    UniquenessProbe,
};
use warden_core::{AppError, AppResult};
use warden_domain::{AccountId, DataScope, RoleId, SortDirection, TreeNode, UniqueTarget};

#[derive(Debug, Clone)]
struct StoredAccount {
    username: String,
    name: String,
    avatar: Option<String>,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    password_hash: String,
    role_ids: Vec<i64>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
struct StoredRole {
    slug: String,
    name: String,
    data_scope: DataScope,
    permission_ids: Vec<i64>,
    menu_ids: Vec<i64>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(Debug, Default)]
struct StoreState {
    last_account_id: i64,
    last_role_id: i64,
    accounts: BTreeMap<i64, StoredAccount>,
    roles: BTreeMap<i64, StoredRole>,
}

impl StoreState {
    fn account_record(&self, id: i64, account: &StoredAccount) -> AccountRecord {
        let roles = account
            .role_ids
            .iter()
            .filter_map(|role_id| {
                self.roles.get(role_id).map(|role| RoleSummary {
                    id: RoleId::new(*role_id),
                    slug: role.slug.clone(),
                    name: role.name.clone(),
                })
            })
            .collect();

        AccountRecord {
            id: AccountId::new(id),
            username: account.username.clone(),
            name: account.name.clone(),
            avatar: account.avatar.clone(),
            start_time: Some(account.start_time),
            end_time: Some(account.end_time),
            password_hash: account.password_hash.clone(),
            roles,
            created_at: Some(account.created_at),
            updated_at: Some(account.updated_at),
        }
    }

    fn username_taken(&self, username: &str, except_id: Option<i64>) -> bool {
        self.accounts
            .iter()
            .any(|(id, account)| Some(*id) != except_id && account.username == username)
    }

    fn slug_taken(&self, slug: &str, except_id: Option<i64>) -> bool {
        self.roles
            .iter()
            .any(|(id, role)| Some(*id) != except_id && role.slug == slug)
    }
}

fn role_record(id: i64, role: &StoredRole) -> RoleRecord {
    RoleRecord {
        id: RoleId::new(id),
        slug: role.slug.clone(),
        name: role.name.clone(),
        data_scope: role.data_scope,
        permission_ids: role.permission_ids.clone(),
        menu_ids: role.menu_ids.clone(),
        created_at: Some(role.created_at),
        updated_at: Some(role.updated_at),
    }
}

/// Comparable value of one grid column.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Number(i64),
    Text(String),
    Time(Option<NaiveDateTime>),
}

fn account_field(record: &AccountRecord, field: &str) -> Option<SortKey> {
    Some(match field {
        "id" => SortKey::Number(record.id.as_i64()),
        "username" => SortKey::Text(record.username.clone()),
        "name" => SortKey::Text(record.name.clone()),
        "start_time" => SortKey::Time(record.start_time),
        "end_time" => SortKey::Time(record.end_time),
        "created_at" => SortKey::Time(record.created_at),
        "updated_at" => SortKey::Time(record.updated_at),
        _ => return None,
    })
}

fn role_field(record: &RoleRecord, field: &str) -> Option<SortKey> {
    Some(match field {
        "id" => SortKey::Number(record.id.as_i64()),
        "slug" => SortKey::Text(record.slug.clone()),
        "name" => SortKey::Text(record.name.clone()),
        "data_scope" => SortKey::Number(i64::from(record.data_scope.as_storage())),
        "created_at" => SortKey::Time(record.created_at),
        "updated_at" => SortKey::Time(record.updated_at),
        _ => return None,
    })
}

fn text_of(key: Option<SortKey>) -> Option<String> {
    match key? {
        SortKey::Number(value) => Some(value.to_string()),
        SortKey::Text(value) => Some(value),
        SortKey::Time(value) => value.map(|value| value.to_string()),
    }
}

fn paginate<T>(
    mut records: Vec<T>,
    query: &ListQuery,
    id_of: impl Fn(&T) -> i64,
    field_of: impl Fn(&T, &str) -> Option<SortKey>,
) -> Page<T> {
    records.retain(|record| {
        query.matches(id_of(record), |field| text_of(field_of(record, field)))
    });

    let field = query.sort.field.as_str();
    records.sort_by(|left, right| {
        let ordering = field_of(left, field)
            .cmp(&field_of(right, field))
            .then_with(|| id_of(left).cmp(&id_of(right)));
        match query.sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let total = u64::try_from(records.len()).unwrap_or(u64::MAX);
    let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
    let per_page = usize::try_from(query.per_page).unwrap_or(usize::MAX);
    let items = records.into_iter().skip(offset).take(per_page).collect();

    Page { items, total }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// In-memory implementation of the account, role and uniqueness ports.
pub struct InMemoryAdminStore {
    tables: AdminTables,
    state: RwLock<StoreState>,
}

impl InMemoryAdminStore {
    /// Creates an empty store answering uniqueness checks for the given tables.
    #[must_use]
    pub fn new(tables: AdminTables) -> Self {
        Self {
            tables,
            state: RwLock::new(StoreState::default()),
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryAdminStore {
    async fn list_accounts(&self, query: &ListQuery) -> AppResult<Page<AccountRecord>> {
        let state = self.state.read().await;
        let records: Vec<AccountRecord> = state
            .accounts
            .iter()
            .map(|(id, account)| state.account_record(*id, account))
            .collect();

        Ok(paginate(
            records,
            query,
            |record: &AccountRecord| record.id.as_i64(),
            account_field,
        ))
    }

    async fn find_account(&self, account_id: AccountId) -> AppResult<Option<AccountRecord>> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .get(&account_id.as_i64())
            .map(|account| state.account_record(account_id.as_i64(), account)))
    }

    async fn create_account(&self, draft: AccountDraft) -> AppResult<AccountRecord> {
        let password_hash = draft.password_hash.ok_or_else(|| {
            AppError::Validation("a password hash is required for new accounts".to_owned())
        })?;

        let mut state = self.state.write().await;
        if state.username_taken(&draft.username, None) {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                draft.username
            )));
        }

        state.last_account_id += 1;
        let id = state.last_account_id;
        let timestamp = now();
        let account = StoredAccount {
            username: draft.username,
            name: draft.name,
            avatar: draft.avatar,
            start_time: draft.start_time,
            end_time: draft.end_time,
            password_hash,
            role_ids: draft
                .role_ids
                .unwrap_or_default()
                .iter()
                .map(RoleId::as_i64)
                .collect(),
            created_at: timestamp,
            updated_at: timestamp,
        };
        let record = state.account_record(id, &account);
        state.accounts.insert(id, account);

        Ok(record)
    }

    async fn update_account(
        &self,
        account_id: AccountId,
        draft: AccountDraft,
    ) -> AppResult<AccountRecord> {
        let id = account_id.as_i64();
        let mut state = self.state.write().await;
        if state.username_taken(&draft.username, Some(id)) {
            return Err(AppError::Conflict(format!(
                "username '{}' is already taken",
                draft.username
            )));
        }

        let Some(account) = state.accounts.get_mut(&id) else {
            return Err(AppError::NotFound(format!(
                "account '{account_id}' does not exist"
            )));
        };

        account.username = draft.username;
        account.name = draft.name;
        account.avatar = draft.avatar;
        account.start_time = draft.start_time;
        account.end_time = draft.end_time;
        if let Some(password_hash) = draft.password_hash {
            account.password_hash = password_hash;
        }
        if let Some(role_ids) = draft.role_ids {
            account.role_ids = role_ids.iter().map(RoleId::as_i64).collect();
        }
        account.updated_at = now();

        let account = account.clone();
        Ok(state.account_record(id, &account))
    }

    async fn delete_account(&self, account_id: AccountId) -> AppResult<()> {
        let mut state = self.state.write().await;
        state
            .accounts
            .remove(&account_id.as_i64())
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("account '{account_id}' does not exist")))
    }
}

#[async_trait]
impl RoleRepository for InMemoryAdminStore {
    async fn list_roles(&self, query: &ListQuery) -> AppResult<Page<RoleRecord>> {
        let state = self.state.read().await;
        let records: Vec<RoleRecord> = state
            .roles
            .iter()
            .map(|(id, role)| role_record(*id, role))
            .collect();

        Ok(paginate(
            records,
            query,
            |record: &RoleRecord| record.id.as_i64(),
            role_field,
        ))
    }

    async fn all_roles(&self) -> AppResult<Vec<RoleRecord>> {
        let state = self.state.read().await;
        Ok(state
            .roles
            .iter()
            .map(|(id, role)| role_record(*id, role))
            .collect())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleRecord>> {
        let state = self.state.read().await;
        Ok(state
            .roles
            .get(&role_id.as_i64())
            .map(|role| role_record(role_id.as_i64(), role)))
    }

    async fn permission_ids_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<i64>> {
        let state = self.state.read().await;
        let mut permission_ids: Vec<i64> = role_ids
            .iter()
            .filter_map(|role_id| state.roles.get(&role_id.as_i64()))
            .flat_map(|role| role.permission_ids.iter().copied())
            .collect();
        permission_ids.sort_unstable();
        permission_ids.dedup();

        Ok(permission_ids)
    }

    async fn create_role(&self, draft: RoleDraft) -> AppResult<RoleRecord> {
        let mut state = self.state.write().await;
        if state.slug_taken(&draft.slug, None) {
            return Err(AppError::Conflict(format!(
                "role slug '{}' already exists",
                draft.slug
            )));
        }

        state.last_role_id += 1;
        let id = state.last_role_id;
        let timestamp = now();
        let role = StoredRole {
            slug: draft.slug,
            name: draft.name,
            data_scope: draft.data_scope,
            permission_ids: draft.permission_ids,
            menu_ids: draft.menu_ids.unwrap_or_default(),
            created_at: timestamp,
            updated_at: timestamp,
        };
        let record = role_record(id, &role);
        state.roles.insert(id, role);

        Ok(record)
    }

    async fn update_role(&self, role_id: RoleId, draft: RoleDraft) -> AppResult<RoleRecord> {
        let id = role_id.as_i64();
        let mut state = self.state.write().await;
        if state.slug_taken(&draft.slug, Some(id)) {
            return Err(AppError::Conflict(format!(
                "role slug '{}' already exists",
                draft.slug
            )));
        }

        let Some(role) = state.roles.get_mut(&id) else {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        };

        role.slug = draft.slug;
        role.name = draft.name;
        role.data_scope = draft.data_scope;
        role.permission_ids = draft.permission_ids;
        if let Some(menu_ids) = draft.menu_ids {
            role.menu_ids = menu_ids;
        }
        role.updated_at = now();

        Ok(role_record(id, role))
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let id = role_id.as_i64();
        let mut state = self.state.write().await;
        if state.roles.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        for account in state.accounts.values_mut() {
            account.role_ids.retain(|assigned| *assigned != id);
        }

        Ok(())
    }
}

#[async_trait]
impl UniquenessProbe for InMemoryAdminStore {
    async fn value_exists(
        &self,
        target: &UniqueTarget,
        value: &str,
        except_id: Option<i64>,
    ) -> AppResult<bool> {
        let state = self.state.read().await;
        match (target.table.as_str(), target.column.as_str()) {
            (table, "username") if table == self.tables.users => {
                Ok(state.username_taken(value, except_id))
            }
            (table, "slug") if table == self.tables.roles => Ok(state.slug_taken(value, except_id)),
            (table, column) => Err(AppError::Internal(format!(
                "no in-memory uniqueness index for '{table}.{column}'"
            ))),
        }
    }
}

/// Fixed in-memory node forest serving as permission or menu source.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNodeRepository {
    nodes: Vec<TreeNode>,
}

impl InMemoryNodeRepository {
    /// Creates a repository over the given nodes, kept in sibling order.
    #[must_use]
    pub fn new(mut nodes: Vec<TreeNode>) -> Self {
        nodes.sort_by_key(|node| (node.order, node.id));
        Self { nodes }
    }
}

#[async_trait]
impl PermissionNodeRepository for InMemoryNodeRepository {
    async fn all_nodes(&self) -> AppResult<Vec<TreeNode>> {
        Ok(self.nodes.clone())
    }
}

#[async_trait]
impl MenuNodeRepository for InMemoryNodeRepository {
    async fn all_nodes(&self) -> AppResult<Vec<TreeNode>> {
        Ok(self.nodes.clone())
    }
}
