use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};

use warden_application::{
    AccountDraft, AccountRecord, AccountRepository, AdminTables, ListQuery, Page, RoleSummary,
};
use warden_core::{AppError, AppResult};
use warden_domain::{AccountId, RoleId};

use crate::postgres_listing::{push_page, push_search, row_total};

/// PostgreSQL-backed repository for administrator accounts.
#[derive(Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
    tables: AdminTables,
}

impl PostgresAccountRepository {
    /// Creates a repository with the provided pool and validated table names.
    pub fn new(pool: PgPool, tables: AdminTables) -> AppResult<Self> {
        tables.validate()?;
        Ok(Self { pool, tables })
    }

    fn select_accounts(&self) -> String {
        format!(
            "SELECT id, username, name, avatar, start_time, end_time, password, created_at, updated_at FROM {}",
            self.tables.users
        )
    }

    async fn roles_by_account(
        &self,
        account_ids: &[i64],
    ) -> AppResult<HashMap<i64, Vec<RoleSummary>>> {
        let rows = sqlx::query_as::<_, AccountRoleRow>(&format!(
            r#"
            SELECT pivot.user_id, roles.id, roles.slug, roles.name
            FROM {pivot} AS pivot
            JOIN {roles} AS roles ON roles.id = pivot.role_id
            WHERE pivot.user_id = ANY($1)
            ORDER BY pivot.user_id, pivot.created_at, roles.id
            "#,
            pivot = self.tables.role_users,
            roles = self.tables.roles,
        ))
        .bind(account_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load account roles: {error}")))?;

        let mut roles: HashMap<i64, Vec<RoleSummary>> = HashMap::new();
        for row in rows {
            roles.entry(row.user_id).or_default().push(RoleSummary {
                id: RoleId::new(row.id),
                slug: row.slug,
                name: row.name,
            });
        }

        Ok(roles)
    }

    async fn attach_roles(&self, rows: Vec<AccountRow>) -> AppResult<Vec<AccountRecord>> {
        let account_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut roles = self.roles_by_account(&account_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let account_roles = roles.remove(&row.id).unwrap_or_default();
                row.into_record(account_roles)
            })
            .collect())
    }

    async fn replace_roles(
        &self,
        transaction: &mut Transaction<'_, Postgres>,
        account_id: i64,
        role_ids: &[RoleId],
    ) -> AppResult<()> {
        sqlx::query(&format!(
            "DELETE FROM {} WHERE user_id = $1",
            self.tables.role_users
        ))
        .bind(account_id)
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear account roles: {error}")))?;

        let insert = format!(
            "INSERT INTO {} (role_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            self.tables.role_users
        );
        for role_id in role_ids {
            sqlx::query(&insert)
                .bind(role_id.as_i64())
                .bind(account_id)
                .execute(&mut **transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to assign account role: {error}"))
                })?;
        }

        Ok(())
    }

    async fn reload(&self, account_id: AccountId) -> AppResult<AccountRecord> {
        self.find_account(account_id).await?.ok_or_else(|| {
            AppError::Internal(format!("account '{account_id}' vanished after write"))
        })
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: i64,
    username: String,
    name: String,
    avatar: Option<String>,
    start_time: Option<NaiveDateTime>,
    end_time: Option<NaiveDateTime>,
    password: String,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl AccountRow {
    fn into_record(self, roles: Vec<RoleSummary>) -> AccountRecord {
        AccountRecord {
            id: AccountId::new(self.id),
            username: self.username,
            name: self.name,
            avatar: self.avatar,
            start_time: self.start_time,
            end_time: self.end_time,
            password_hash: self.password,
            roles,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct AccountRoleRow {
    user_id: i64,
    id: i64,
    slug: String,
    name: String,
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn list_accounts(&self, query: &ListQuery) -> AppResult<Page<AccountRecord>> {
        let mut count: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.tables.users));
        push_search(&mut count, query)?;
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count accounts: {error}")))?;

        let mut select: QueryBuilder<'_, Postgres> = QueryBuilder::new(self.select_accounts());
        push_search(&mut select, query)?;
        push_page(&mut select, query)?;
        let rows = select
            .build_query_as::<AccountRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list accounts: {error}")))?;

        Ok(Page {
            items: self.attach_roles(rows).await?,
            total: row_total(total),
        })
    }

    async fn find_account(&self, account_id: AccountId) -> AppResult<Option<AccountRecord>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "{} WHERE id = $1",
            self.select_accounts()
        ))
        .bind(account_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find account: {error}")))?;

        match row {
            Some(row) => Ok(self.attach_roles(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_account(&self, draft: AccountDraft) -> AppResult<AccountRecord> {
        let password_hash = draft.password_hash.as_deref().ok_or_else(|| {
            AppError::Validation("a password hash is required for new accounts".to_owned())
        })?;

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let account_id = sqlx::query_scalar::<_, i64>(&format!(
            r#"
            INSERT INTO {} (username, name, avatar, start_time, end_time, password)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
            self.tables.users
        ))
        .bind(draft.username.as_str())
        .bind(draft.name.as_str())
        .bind(draft.avatar.as_deref())
        .bind(draft.start_time)
        .bind(draft.end_time)
        .bind(password_hash)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_username_conflict(error, draft.username.as_str()))?;

        if let Some(role_ids) = &draft.role_ids {
            self.replace_roles(&mut transaction, account_id, role_ids)
                .await?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        self.reload(AccountId::new(account_id)).await
    }

    async fn update_account(
        &self,
        account_id: AccountId,
        draft: AccountDraft,
    ) -> AppResult<AccountRecord> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let result = sqlx::query(&format!(
            r#"
            UPDATE {}
            SET username = $2,
                name = $3,
                avatar = $4,
                start_time = $5,
                end_time = $6,
                password = COALESCE($7, password),
                updated_at = now()
            WHERE id = $1
            "#,
            self.tables.users
        ))
        .bind(account_id.as_i64())
        .bind(draft.username.as_str())
        .bind(draft.name.as_str())
        .bind(draft.avatar.as_deref())
        .bind(draft.start_time)
        .bind(draft.end_time)
        .bind(draft.password_hash.as_deref())
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_username_conflict(error, draft.username.as_str()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "account '{account_id}' does not exist"
            )));
        }

        if let Some(role_ids) = &draft.role_ids {
            self.replace_roles(&mut transaction, account_id.as_i64(), role_ids)
                .await?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        self.reload(account_id).await
    }

    async fn delete_account(&self, account_id: AccountId) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        self.replace_roles(&mut transaction, account_id.as_i64(), &[])
            .await?;

        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.tables.users))
            .bind(account_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete account: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "account '{account_id}' does not exist"
            )));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }
}

fn map_username_conflict(error: sqlx::Error, username: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("username '{username}' is already taken"));
    }

    AppError::Internal(format!("failed to save account: {error}"))
}
