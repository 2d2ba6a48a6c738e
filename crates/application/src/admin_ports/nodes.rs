use async_trait::async_trait;

use warden_core::AppResult;
use warden_domain::TreeNode;

/// Read port for the permission node forest.
#[async_trait]
pub trait PermissionNodeRepository: Send + Sync {
    /// Lists every permission node.
    async fn all_nodes(&self) -> AppResult<Vec<TreeNode>>;
}

/// Read port for the menu node forest.
#[async_trait]
pub trait MenuNodeRepository: Send + Sync {
    /// Lists every menu node.
    async fn all_nodes(&self) -> AppResult<Vec<TreeNode>>;
}

/// Shared cache of the menu structure.
#[async_trait]
pub trait MenuCache: Send + Sync {
    /// Returns the cached menu nodes, if present.
    async fn get_menu(&self) -> AppResult<Option<Vec<TreeNode>>>;

    /// Stores the menu nodes.
    async fn put_menu(&self, nodes: &[TreeNode]) -> AppResult<()>;

    /// Drops the cached menu so the next read reloads it.
    async fn invalidate(&self) -> AppResult<()>;
}
