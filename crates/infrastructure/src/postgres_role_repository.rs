use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};

use warden_application::{AdminTables, ListQuery, Page, RoleDraft, RoleRecord, RoleRepository};
use warden_core::{AppError, AppResult};
use warden_domain::{DataScope, RoleId};

use crate::postgres_listing::{push_page, push_search, row_total};

/// PostgreSQL-backed repository for roles and their permission and menu grants.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
    tables: AdminTables,
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: i64,
    slug: String,
    name: String,
    data_scope: i16,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, FromRow)]
struct GrantRow {
    role_id: i64,
    node_id: i64,
}

/// Pivot table and node column for one kind of grant.
#[derive(Clone, Copy)]
enum Grant {
    Permissions,
    Menu,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided pool and validated table names.
    pub fn new(pool: PgPool, tables: AdminTables) -> AppResult<Self> {
        tables.validate()?;
        Ok(Self { pool, tables })
    }

    fn pivot(&self, grant: Grant) -> (&str, &'static str) {
        match grant {
            Grant::Permissions => (self.tables.role_permissions.as_str(), "permission_id"),
            Grant::Menu => (self.tables.role_menu.as_str(), "menu_id"),
        }
    }

    fn select_roles(&self) -> String {
        format!(
            "SELECT id, slug, name, data_scope, created_at, updated_at FROM {}",
            self.tables.roles
        )
    }

    async fn grants(&self, grant: Grant, role_ids: &[i64]) -> AppResult<HashMap<i64, Vec<i64>>> {
        let (table, column) = self.pivot(grant);
        let rows = sqlx::query_as::<_, GrantRow>(&format!(
            "SELECT role_id, {column} AS node_id FROM {table} WHERE role_id = ANY($1) ORDER BY role_id, {column}"
        ))
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role grants: {error}")))?;

        let mut grants: HashMap<i64, Vec<i64>> = HashMap::new();
        for row in rows {
            grants.entry(row.role_id).or_default().push(row.node_id);
        }

        Ok(grants)
    }

    async fn attach_grants(&self, rows: Vec<RoleRow>) -> AppResult<Vec<RoleRecord>> {
        let role_ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let mut permissions = self.grants(Grant::Permissions, &role_ids).await?;
        let mut menus = self.grants(Grant::Menu, &role_ids).await?;

        rows.into_iter()
            .map(|row| {
                let permission_ids = permissions.remove(&row.id).unwrap_or_default();
                let menu_ids = menus.remove(&row.id).unwrap_or_default();
                Ok(RoleRecord {
                    id: RoleId::new(row.id),
                    slug: row.slug,
                    name: row.name,
                    data_scope: DataScope::from_storage(i64::from(row.data_scope)).map_err(
                        |error| AppError::Internal(format!("invalid stored data scope: {error}")),
                    )?,
                    permission_ids,
                    menu_ids,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                })
            })
            .collect()
    }

    async fn replace_grants(
        &self,
        transaction: &mut Transaction<'_, Postgres>,
        grant: Grant,
        role_id: i64,
        node_ids: &[i64],
    ) -> AppResult<()> {
        let (table, column) = self.pivot(grant);
        sqlx::query(&format!("DELETE FROM {table} WHERE role_id = $1"))
            .bind(role_id)
            .execute(&mut **transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to clear role grants: {error}")))?;

        let insert = format!(
            "INSERT INTO {table} (role_id, {column}) VALUES ($1, $2) ON CONFLICT DO NOTHING"
        );
        for node_id in node_ids {
            sqlx::query(&insert)
                .bind(role_id)
                .bind(node_id)
                .execute(&mut **transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to insert role grant: {error}"))
                })?;
        }

        Ok(())
    }

    async fn write_grants(
        &self,
        transaction: &mut Transaction<'_, Postgres>,
        role_id: i64,
        draft: &RoleDraft,
    ) -> AppResult<()> {
        self.replace_grants(transaction, Grant::Permissions, role_id, &draft.permission_ids)
            .await?;
        if let Some(menu_ids) = &draft.menu_ids {
            self.replace_grants(transaction, Grant::Menu, role_id, menu_ids)
                .await?;
        }

        Ok(())
    }

    async fn reload(&self, role_id: RoleId) -> AppResult<RoleRecord> {
        self.find_role(role_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("role '{role_id}' vanished after write")))
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self, query: &ListQuery) -> AppResult<Page<RoleRecord>> {
        let mut count: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.tables.roles));
        push_search(&mut count, query)?;
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to count roles: {error}")))?;

        let mut select: QueryBuilder<'_, Postgres> = QueryBuilder::new(self.select_roles());
        push_search(&mut select, query)?;
        push_page(&mut select, query)?;
        let rows = select
            .build_query_as::<RoleRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        Ok(Page {
            items: self.attach_grants(rows).await?,
            total: row_total(total),
        })
    }

    async fn all_roles(&self) -> AppResult<Vec<RoleRecord>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!("{} ORDER BY id", self.select_roles()))
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        self.attach_grants(rows).await
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleRecord>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!("{} WHERE id = $1", self.select_roles()))
            .bind(role_id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        match row {
            Some(row) => Ok(self.attach_grants(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn permission_ids_for_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<i64>> {
        let role_ids: Vec<i64> = role_ids.iter().map(RoleId::as_i64).collect();
        sqlx::query_scalar::<_, i64>(&format!(
            "SELECT DISTINCT permission_id FROM {} WHERE role_id = ANY($1) ORDER BY permission_id",
            self.tables.role_permissions
        ))
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role permissions: {error}")))
    }

    async fn create_role(&self, draft: RoleDraft) -> AppResult<RoleRecord> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let role_id = sqlx::query_scalar::<_, i64>(&format!(
            "INSERT INTO {} (slug, name, data_scope) VALUES ($1, $2, $3) RETURNING id",
            self.tables.roles
        ))
        .bind(draft.slug.as_str())
        .bind(draft.name.as_str())
        .bind(draft.data_scope.as_storage())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_slug_conflict(error, draft.slug.as_str()))?;

        self.write_grants(&mut transaction, role_id, &draft).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        self.reload(RoleId::new(role_id)).await
    }

    async fn update_role(&self, role_id: RoleId, draft: RoleDraft) -> AppResult<RoleRecord> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let result = sqlx::query(&format!(
            r#"
            UPDATE {}
            SET slug = $2,
                name = $3,
                data_scope = $4,
                updated_at = now()
            WHERE id = $1
            "#,
            self.tables.roles
        ))
        .bind(role_id.as_i64())
        .bind(draft.slug.as_str())
        .bind(draft.name.as_str())
        .bind(draft.data_scope.as_storage())
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_slug_conflict(error, draft.slug.as_str()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        self.write_grants(&mut transaction, role_id.as_i64(), &draft)
            .await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        self.reload(role_id).await
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        self.replace_grants(&mut transaction, Grant::Permissions, role_id.as_i64(), &[])
            .await?;
        self.replace_grants(&mut transaction, Grant::Menu, role_id.as_i64(), &[])
            .await?;
        sqlx::query(&format!(
            "DELETE FROM {} WHERE role_id = $1",
            self.tables.role_users
        ))
        .bind(role_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear role accounts: {error}")))?;

        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.tables.roles))
            .bind(role_id.as_i64())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }
}

fn map_slug_conflict(error: sqlx::Error, slug: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(format!("role slug '{slug}' already exists"));
    }

    AppError::Internal(format!("failed to save role: {error}"))
}
