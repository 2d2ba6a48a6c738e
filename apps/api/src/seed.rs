use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{info, warn};
use warden_application::{
    AccountDraft, AccountRecord, AccountRepository, ListQuery, PasswordHasher, RoleDraft,
    RoleRecord, RoleRepository,
};
use warden_core::{AppError, AppResult};
use warden_domain::{DataScope, RoleId, SortDirection, SortOrder};
use warden_infrastructure::{
    Argon2PasswordHasher, PostgresAccountRepository, PostgresRoleRepository,
};

use crate::api_config::ApiConfig;

const SEED_ADMIN_USERNAME: &str = "admin";
const SEED_ADMIN_NAME: &str = "Administrator";
const SEED_VALIDITY_DAYS: i64 = 364;

/// Creates the administrator role and the default account when missing.
pub async fn run(pool: PgPool, config: &ApiConfig) -> AppResult<()> {
    let password = config.seed_admin_password.as_deref().ok_or_else(|| {
        AppError::Validation("SEED_ADMIN_PASSWORD is required for seeding".to_owned())
    })?;
    let tables = config.admin.tables().clone();
    let roles = PostgresRoleRepository::new(pool.clone(), tables.clone())?;
    let accounts = PostgresAccountRepository::new(pool, tables)?;
    let protection = config.admin.protection();

    let role = ensure_administrator_role(&roles, protection.administrator_slug()).await?;
    if role.id.as_i64() != protection.administrator_role_id() {
        warn!(
            role_id = %role.id,
            protected_id = protection.administrator_role_id(),
            "administrator role id differs from the protected role id"
        );
    }

    let password_hash = Argon2PasswordHasher::new().hash_password(password)?;
    let account = ensure_admin_account(&accounts, role.id, password_hash).await?;
    if account.id.as_i64() != protection.default_account_id() {
        warn!(
            account_id = %account.id,
            protected_id = protection.default_account_id(),
            "seeded account id differs from the protected account id"
        );
    }

    Ok(())
}

async fn ensure_administrator_role(
    roles: &PostgresRoleRepository,
    slug: &str,
) -> AppResult<RoleRecord> {
    if let Some(existing) = roles
        .all_roles()
        .await?
        .into_iter()
        .find(|role| role.slug == slug)
    {
        info!(role_id = %existing.id, "administrator role already present");
        return Ok(existing);
    }

    let role = roles
        .create_role(RoleDraft {
            slug: slug.to_owned(),
            name: SEED_ADMIN_NAME.to_owned(),
            data_scope: DataScope::All,
            permission_ids: Vec::new(),
            menu_ids: None,
        })
        .await?;
    info!(role_id = %role.id, "administrator role created");

    Ok(role)
}

async fn ensure_admin_account(
    accounts: &PostgresAccountRepository,
    role_id: RoleId,
    password_hash: String,
) -> AppResult<AccountRecord> {
    let existing = accounts
        .list_accounts(&ListQuery {
            search: Some(SEED_ADMIN_USERNAME.to_owned()),
            search_fields: vec!["username".to_owned()],
            sort: SortOrder {
                field: "id".to_owned(),
                direction: SortDirection::Asc,
            },
            page: 1,
            per_page: 50,
        })
        .await?
        .items
        .into_iter()
        .find(|account| account.username == SEED_ADMIN_USERNAME);
    if let Some(existing) = existing {
        info!(account_id = %existing.id, "default account already present");
        return Ok(existing);
    }

    let start_time = Utc::now().naive_utc();
    let account = accounts
        .create_account(AccountDraft {
            username: SEED_ADMIN_USERNAME.to_owned(),
            name: SEED_ADMIN_NAME.to_owned(),
            avatar: None,
            start_time,
            end_time: start_time + Duration::days(SEED_VALIDITY_DAYS),
            password_hash: Some(password_hash),
            role_ids: Some(vec![role_id]),
        })
        .await?;
    info!(account_id = %account.id, "default account created");

    Ok(account)
}
