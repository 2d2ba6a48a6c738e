//! Permission and menu node readers.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use warden_application::{AdminTables, MenuNodeRepository, PermissionNodeRepository};
use warden_core::{AppError, AppResult};
use warden_domain::TreeNode;

#[derive(Debug, FromRow)]
struct NodeRow {
    id: i64,
    parent_id: i64,
    title: String,
    order: i32,
}

impl From<NodeRow> for TreeNode {
    fn from(row: NodeRow) -> Self {
        let parent_id = (row.parent_id != 0).then_some(row.parent_id);
        TreeNode::new(row.id, parent_id, row.title, row.order)
    }
}

async fn load_nodes(pool: &PgPool, sql: &str, kind: &str) -> AppResult<Vec<TreeNode>> {
    let rows = sqlx::query_as::<_, NodeRow>(sql)
        .fetch_all(pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load {kind} nodes: {error}")))?;

    Ok(rows.into_iter().map(TreeNode::from).collect())
}

/// PostgreSQL reader for the permission forest. Titles come from the
/// permission name.
#[derive(Clone)]
pub struct PostgresPermissionNodeRepository {
    pool: PgPool,
    table: String,
}

impl PostgresPermissionNodeRepository {
    /// Creates a reader over the configured permission table.
    pub fn new(pool: PgPool, tables: &AdminTables) -> AppResult<Self> {
        tables.validate()?;
        Ok(Self {
            pool,
            table: tables.permissions.clone(),
        })
    }
}

#[async_trait]
impl PermissionNodeRepository for PostgresPermissionNodeRepository {
    async fn all_nodes(&self) -> AppResult<Vec<TreeNode>> {
        load_nodes(
            &self.pool,
            &format!(
                r#"SELECT id, parent_id, name AS title, "order" FROM {} ORDER BY "order", id"#,
                self.table
            ),
            "permission",
        )
        .await
    }
}

/// PostgreSQL reader for the menu forest.
#[derive(Clone)]
pub struct PostgresMenuNodeRepository {
    pool: PgPool,
    table: String,
}

impl PostgresMenuNodeRepository {
    /// Creates a reader over the configured menu table.
    pub fn new(pool: PgPool, tables: &AdminTables) -> AppResult<Self> {
        tables.validate()?;
        Ok(Self {
            pool,
            table: tables.menu.clone(),
        })
    }
}

#[async_trait]
impl MenuNodeRepository for PostgresMenuNodeRepository {
    async fn all_nodes(&self) -> AppResult<Vec<TreeNode>> {
        load_nodes(
            &self.pool,
            &format!(
                r#"SELECT id, parent_id, title, "order" FROM {} ORDER BY "order", id"#,
                self.table
            ),
            "menu",
        )
        .await
    }
}
