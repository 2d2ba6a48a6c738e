//! Redis-backed menu cache.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tracing::debug;
use warden_application::MenuCache;
use warden_core::{AppError, AppResult};
use warden_domain::TreeNode;

/// Redis implementation of the menu cache port. The menu is stored as one JSON
/// document under a single key with no expiry.
#[derive(Clone)]
pub struct RedisMenuCache {
    client: redis::Client,
    key: String,
}

impl RedisMenuCache {
    /// Creates a cache adapter with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl AsRef<str>) -> Self {
        Self {
            client,
            key: format!("{}:menu", key_prefix.as_ref()),
        }
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl MenuCache for RedisMenuCache {
    async fn get_menu(&self) -> AppResult<Option<Vec<TreeNode>>> {
        let mut connection = self.connection().await?;
        let encoded: Option<String> = connection
            .get(self.key.as_str())
            .await
            .map_err(|error| AppError::Internal(format!("failed to read menu cache: {error}")))?;

        encoded
            .map(|value| {
                serde_json::from_str::<Vec<TreeNode>>(&value).map_err(|error| {
                    AppError::Internal(format!("invalid menu cache entry: {error}"))
                })
            })
            .transpose()
    }

    async fn put_menu(&self, nodes: &[TreeNode]) -> AppResult<()> {
        let value = serde_json::to_string(nodes)
            .map_err(|error| AppError::Internal(format!("failed to encode menu: {error}")))?;
        let mut connection = self.connection().await?;

        connection
            .set(self.key.as_str(), value)
            .await
            .map_err(|error| AppError::Internal(format!("failed to write menu cache: {error}")))
    }

    async fn invalidate(&self) -> AppResult<()> {
        let mut connection = self.connection().await?;

        let removed: i64 = connection
            .del(self.key.as_str())
            .await
            .map_err(|error| AppError::Internal(format!("failed to clear menu cache: {error}")))?;

        debug!(key = %self.key, removed, "menu cache cleared");
        Ok(())
    }
}
