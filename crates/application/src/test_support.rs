use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::Mutex;

use warden_core::{AppError, AppResult};
use warden_domain::{
    AccountId, DataScope, ProtectionPolicy, RoleId, SortDirection, TreeNode, UniqueTarget,
    parse_datetime,
};

use crate::{
    AccountDraft, AccountRecord, AccountRepository, AdminConfig, AdminTables, ListQuery,
    MenuCache, MenuNodeRepository, Page, PasswordHasher, PermissionNodeRepository, RoleDraft,
    RoleRecord, RoleRepository, RoleSummary, UniquenessProbe,
};

pub(crate) fn config(permission_enabled: bool, role_bind_menu: bool) -> AdminConfig {
    let protection =
        ProtectionPolicy::new(1, 1, "administrator").unwrap_or_else(|_| unreachable!());
    AdminConfig::new(
        "main",
        AdminTables::default(),
        permission_enabled,
        role_bind_menu,
        protection,
    )
    .unwrap_or_else(|_| unreachable!())
}

pub(crate) fn at(value: &str) -> NaiveDateTime {
    parse_datetime(value).unwrap_or_else(|_| unreachable!())
}

pub(crate) fn role(id: i64, slug: &str, permission_ids: Vec<i64>) -> RoleRecord {
    RoleRecord {
        id: RoleId::new(id),
        slug: slug.to_owned(),
        name: slug.to_uppercase(),
        data_scope: DataScope::SelfAndCreated,
        permission_ids,
        menu_ids: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn summary(role: &RoleRecord) -> RoleSummary {
    RoleSummary {
        id: role.id,
        slug: role.slug.clone(),
        name: role.name.clone(),
    }
}

pub(crate) fn account(id: i64, username: &str, roles: Vec<RoleSummary>) -> AccountRecord {
    AccountRecord {
        id: AccountId::new(id),
        username: username.to_owned(),
        name: username.to_owned(),
        avatar: None,
        start_time: Some(at("2026-01-01 00:00:00")),
        end_time: Some(at("2026-06-01 00:00:00")),
        password_hash: format!("hashed:{username}-password"),
        roles,
        created_at: None,
        updated_at: None,
    }
}

pub(crate) fn permission_nodes() -> Vec<TreeNode> {
    vec![
        TreeNode::new(1, None, "Auth", 0),
        TreeNode::new(2, Some(1), "Users", 0),
        TreeNode::new(3, Some(1), "Roles", 1),
        TreeNode::new(4, Some(0), "Media", 1),
        TreeNode::new(5, Some(4), "Uploads", 0),
    ]
}

fn page<T: Clone>(mut items: Vec<T>, query: &ListQuery, id: impl Fn(&T) -> i64) -> Page<T> {
    items.sort_by_key(&id);
    if query.sort.direction == SortDirection::Desc {
        items.reverse();
    }

    let total = u64::try_from(items.len()).unwrap_or(u64::MAX);
    let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
    let per_page = usize::try_from(query.per_page).unwrap_or(usize::MAX);
    Page {
        items: items.into_iter().skip(offset).take(per_page).collect(),
        total,
    }
}

#[derive(Default)]
pub(crate) struct FakeAccountRepository {
    pub(crate) accounts: Mutex<Vec<AccountRecord>>,
    pub(crate) role_catalog: Vec<RoleRecord>,
    pub(crate) drafts: Mutex<Vec<AccountDraft>>,
}

impl FakeAccountRepository {
    pub(crate) fn new(accounts: Vec<AccountRecord>, role_catalog: Vec<RoleRecord>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            role_catalog,
            drafts: Mutex::new(Vec::new()),
        }
    }

    fn summaries(&self, role_ids: &[RoleId]) -> Vec<RoleSummary> {
        self.role_catalog
            .iter()
            .filter(|role| role_ids.contains(&role.id))
            .map(summary)
            .collect()
    }
}

#[async_trait]
impl AccountRepository for FakeAccountRepository {
    async fn list_accounts(&self, query: &ListQuery) -> AppResult<Page<AccountRecord>> {
        let accounts = self.accounts.lock().await;
        let matching = accounts
            .iter()
            .filter(|account| {
                query.matches(account.id.as_i64(), |field| match field {
                    "name" => Some(account.name.clone()),
                    "username" => Some(account.username.clone()),
                    _ => None,
                })
            })
            .cloned()
            .collect();
        Ok(page(matching, query, |account| account.id.as_i64()))
    }

    async fn find_account(&self, account_id: AccountId) -> AppResult<Option<AccountRecord>> {
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .find(|account| account.id == account_id)
            .cloned())
    }

    async fn create_account(&self, draft: AccountDraft) -> AppResult<AccountRecord> {
        self.drafts.lock().await.push(draft.clone());
        let mut accounts = self.accounts.lock().await;
        let next_id = accounts
            .iter()
            .map(|account| account.id.as_i64())
            .max()
            .unwrap_or(0)
            + 1;

        let account = AccountRecord {
            id: AccountId::new(next_id),
            username: draft.username,
            name: draft.name,
            avatar: draft.avatar,
            start_time: Some(draft.start_time),
            end_time: Some(draft.end_time),
            password_hash: draft.password_hash.unwrap_or_default(),
            roles: self.summaries(&draft.role_ids.unwrap_or_default()),
            created_at: None,
            updated_at: None,
        };
        accounts.push(account.clone());
        Ok(account)
    }

    async fn update_account(
        &self,
        account_id: AccountId,
        draft: AccountDraft,
    ) -> AppResult<AccountRecord> {
        self.drafts.lock().await.push(draft.clone());
        let mut accounts = self.accounts.lock().await;
        let account = accounts
            .iter_mut()
            .find(|account| account.id == account_id)
            .ok_or_else(|| AppError::NotFound(format!("account '{account_id}'")))?;

        account.username = draft.username;
        account.name = draft.name;
        account.avatar = draft.avatar;
        account.start_time = Some(draft.start_time);
        account.end_time = Some(draft.end_time);
        if let Some(password_hash) = draft.password_hash {
            account.password_hash = password_hash;
        }
        if let Some(role_ids) = draft.role_ids {
            account.roles = self.summaries(&role_ids);
        }
        Ok(account.clone())
    }

    async fn delete_account(&self, account_id: AccountId) -> AppResult<()> {
        self.accounts
            .lock()
            .await
            .retain(|account| account.id != account_id);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeRoleRepository {
    pub(crate) roles: Mutex<Vec<RoleRecord>>,
}

impl FakeRoleRepository {
    pub(crate) fn new(roles: Vec<RoleRecord>) -> Self {
        Self {
            roles: Mutex::new(roles),
        }
    }
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn list_roles(&self, query: &ListQuery) -> AppResult<Page<RoleRecord>> {
        let roles = self.roles.lock().await;
        let matching = roles
            .iter()
            .filter(|role| {
                query.matches(role.id.as_i64(), |field| match field {
                    "name" => Some(role.name.clone()),
                    "slug" => Some(role.slug.clone()),
                    _ => None,
                })
            })
            .cloned()
            .collect();
        Ok(page(matching, query, |role| role.id.as_i64()))
    }

    async fn all_roles(&self) -> AppResult<Vec<RoleRecord>> {
        Ok(self.roles.lock().await.clone())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleRecord>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.id == role_id)
            .cloned())
    }

    async fn permission_ids_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<i64>> {
        let ids: BTreeSet<i64> = self
            .roles
            .lock()
            .await
            .iter()
            .filter(|role| role_ids.contains(&role.id))
            .flat_map(|role| role.permission_ids.iter().copied())
            .collect();
        Ok(ids.into_iter().collect())
    }

    async fn create_role(&self, draft: RoleDraft) -> AppResult<RoleRecord> {
        let mut roles = self.roles.lock().await;
        let next_id = roles.iter().map(|role| role.id.as_i64()).max().unwrap_or(0) + 1;
        let role = RoleRecord {
            id: RoleId::new(next_id),
            slug: draft.slug,
            name: draft.name,
            data_scope: draft.data_scope,
            permission_ids: draft.permission_ids,
            menu_ids: draft.menu_ids.unwrap_or_default(),
            created_at: None,
            updated_at: None,
        };
        roles.push(role.clone());
        Ok(role)
    }

    async fn update_role(&self, role_id: RoleId, draft: RoleDraft) -> AppResult<RoleRecord> {
        let mut roles = self.roles.lock().await;
        let role = roles
            .iter_mut()
            .find(|role| role.id == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}'")))?;

        role.slug = draft.slug;
        role.name = draft.name;
        role.data_scope = draft.data_scope;
        role.permission_ids = draft.permission_ids;
        if let Some(menu_ids) = draft.menu_ids {
            role.menu_ids = menu_ids;
        }
        Ok(role.clone())
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        self.roles.lock().await.retain(|role| role.id != role_id);
        Ok(())
    }
}

pub(crate) struct FakeNodeRepository {
    pub(crate) nodes: Vec<TreeNode>,
    pub(crate) reads: Mutex<u32>,
}

impl FakeNodeRepository {
    pub(crate) fn new(nodes: Vec<TreeNode>) -> Self {
        Self {
            nodes,
            reads: Mutex::new(0),
        }
    }
}

#[async_trait]
impl PermissionNodeRepository for FakeNodeRepository {
    async fn all_nodes(&self) -> AppResult<Vec<TreeNode>> {
        *self.reads.lock().await += 1;
        Ok(self.nodes.clone())
    }
}

#[async_trait]
impl MenuNodeRepository for FakeNodeRepository {
    async fn all_nodes(&self) -> AppResult<Vec<TreeNode>> {
        *self.reads.lock().await += 1;
        Ok(self.nodes.clone())
    }
}

#[derive(Default)]
pub(crate) struct FakeMenuCache {
    pub(crate) menu: Mutex<Option<Vec<TreeNode>>>,
    pub(crate) invalidations: Mutex<u32>,
    pub(crate) fail: bool,
}

#[async_trait]
impl MenuCache for FakeMenuCache {
    async fn get_menu(&self) -> AppResult<Option<Vec<TreeNode>>> {
        Ok(self.menu.lock().await.clone())
    }

    async fn put_menu(&self, nodes: &[TreeNode]) -> AppResult<()> {
        *self.menu.lock().await = Some(nodes.to_vec());
        Ok(())
    }

    async fn invalidate(&self) -> AppResult<()> {
        *self.invalidations.lock().await += 1;
        if self.fail {
            return Err(AppError::Internal("cache unavailable".to_owned()));
        }
        *self.menu.lock().await = None;
        Ok(())
    }
}

pub(crate) struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}

#[derive(Default)]
pub(crate) struct FakeUniquenessProbe {
    pub(crate) taken: Vec<(String, i64, String)>,
}

#[async_trait]
impl UniquenessProbe for FakeUniquenessProbe {
    async fn value_exists(
        &self,
        target: &UniqueTarget,
        value: &str,
        except_id: Option<i64>,
    ) -> AppResult<bool> {
        Ok(self.taken.iter().any(|(column, id, stored)| {
            column == &target.column && stored == value && Some(*id) != except_id
        }))
    }
}
