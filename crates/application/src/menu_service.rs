//! Cached menu structure.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use warden_core::AppResult;
use warden_domain::{TreeSelection, TreeViewModel, build_tree};

use crate::{MenuCache, MenuNodeRepository};

/// Serves the menu tree through the shared menu cache.
#[derive(Clone)]
pub struct MenuService {
    menu_nodes: Arc<dyn MenuNodeRepository>,
    menu_cache: Arc<dyn MenuCache>,
}

impl MenuService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(menu_nodes: Arc<dyn MenuNodeRepository>, menu_cache: Arc<dyn MenuCache>) -> Self {
        Self {
            menu_nodes,
            menu_cache,
        }
    }

    /// Returns the menu tree, loading and caching the nodes on a miss.
    /// Cache failures fall back to the repository.
    pub async fn menu_tree(&self) -> AppResult<TreeViewModel> {
        let cached = match self.menu_cache.get_menu().await {
            Ok(cached) => cached,
            Err(error) => {
                warn!(error = %error, "failed to read cached menu");
                None
            }
        };

        let nodes = match cached {
            Some(nodes) => nodes,
            None => {
                let nodes = self.menu_nodes.all_nodes().await?;
                if let Err(error) = self.menu_cache.put_menu(&nodes).await {
                    warn!(error = %error, "failed to cache menu");
                }
                nodes
            }
        };

        Ok(build_tree(&nodes, &TreeSelection::Ids(HashSet::new())))
    }
}
