use async_trait::async_trait;
use tokio::sync::RwLock;
use warden_application::MenuCache;
use warden_core::AppResult;
use warden_domain::TreeNode;

/// In-memory menu cache for single-process deployments and tests.
#[derive(Default)]
pub struct InMemoryMenuCache {
    menu: RwLock<Option<Vec<TreeNode>>>,
}

impl InMemoryMenuCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MenuCache for InMemoryMenuCache {
    async fn get_menu(&self) -> AppResult<Option<Vec<TreeNode>>> {
        Ok(self.menu.read().await.clone())
    }

    async fn put_menu(&self, nodes: &[TreeNode]) -> AppResult<()> {
        *self.menu.write().await = Some(nodes.to_vec());
        Ok(())
    }

    async fn invalidate(&self) -> AppResult<()> {
        self.menu.write().await.take();
        Ok(())
    }
}
