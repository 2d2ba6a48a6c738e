use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use warden_application::{UniquenessProbe, validate_identifier};
use warden_core::{AppError, AppResult};
use warden_domain::UniqueTarget;

/// Answers uniqueness checks against named PostgreSQL connections.
#[derive(Clone, Default)]
pub struct PostgresUniquenessProbe {
    connections: HashMap<String, PgPool>,
}

impl PostgresUniquenessProbe {
    /// Creates a probe with no registered connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pool under a connection name.
    #[must_use]
    pub fn with_connection(mut self, name: impl Into<String>, pool: PgPool) -> Self {
        self.connections.insert(name.into(), pool);
        self
    }
}

#[async_trait]
impl UniquenessProbe for PostgresUniquenessProbe {
    async fn value_exists(
        &self,
        target: &UniqueTarget,
        value: &str,
        except_id: Option<i64>,
    ) -> AppResult<bool> {
        validate_identifier(&target.table)?;
        validate_identifier(&target.column)?;

        let pool = self.connections.get(&target.connection).ok_or_else(|| {
            AppError::Internal(format!(
                "unknown database connection '{}'",
                target.connection
            ))
        })?;

        sqlx::query_scalar::<_, bool>(&format!(
            "SELECT EXISTS(SELECT 1 FROM {table} WHERE {column} = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
            table = target.table,
            column = target.column,
        ))
        .bind(value)
        .bind(except_id)
        .fetch_one(pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check uniqueness: {error}")))
    }
}
