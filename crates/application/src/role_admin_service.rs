//! Role screens and save workflow.

use std::sync::Arc;

use tracing::{info, warn};

use warden_core::{AppError, AppResult};
use warden_domain::{DataScope, FormDeclaration, FormMode, RoleId, TreeSelection, build_tree};

use crate::{
    AdminConfig, DetailScreen, FormScreen, FormSubmission, FormValidator, GridRequest, GridRow,
    GridScreen, MenuCache, MenuNodeRepository, PermissionNodeRepository, RoleDraft, RoleRecord,
    RoleRepository, role_detail, role_form, role_grid,
};

/// Application service behind the role administration screens.
#[derive(Clone)]
pub struct RoleAdminService {
    config: AdminConfig,
    roles: Arc<dyn RoleRepository>,
    permission_nodes: Arc<dyn PermissionNodeRepository>,
    menu_nodes: Arc<dyn MenuNodeRepository>,
    menu_cache: Arc<dyn MenuCache>,
    validator: FormValidator,
}

impl RoleAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        config: AdminConfig,
        roles: Arc<dyn RoleRepository>,
        permission_nodes: Arc<dyn PermissionNodeRepository>,
        menu_nodes: Arc<dyn MenuNodeRepository>,
        menu_cache: Arc<dyn MenuCache>,
        validator: FormValidator,
    ) -> Self {
        Self {
            config,
            roles,
            permission_nodes,
            menu_nodes,
            menu_cache,
            validator,
        }
    }

    /// Returns the create or edit form with initial values.
    pub async fn form_screen(&self, mode: FormMode) -> AppResult<FormScreen> {
        let existing = self.existing(mode).await?;
        let declaration = self.declaration(mode, existing.as_ref()).await?;

        let values = match existing {
            Some(role) => declaration.prefill(&role.to_screen_values()),
            None => {
                let mut values = declaration.prefill(&serde_json::Map::new());
                values.insert(
                    "data_scope".to_owned(),
                    serde_json::json!(DataScope::default().as_storage()),
                );
                values
            }
        };

        Ok(FormScreen {
            declaration,
            values,
        })
    }

    /// Returns one rendered page of the role grid. Administrator roles
    /// cannot be deleted from the grid.
    pub async fn grid_screen(&self, request: GridRequest) -> AppResult<GridScreen> {
        let declaration = role_grid();
        let query = request.into_query(&declaration)?;
        let page = self.roles.list_roles(&query).await?;

        let protection = self.config.protection();
        let rows = page
            .items
            .iter()
            .map(|role| GridRow {
                id: role.id.as_i64(),
                cells: declaration.render_row(&role.to_screen_values()),
                actions: declaration
                    .row_actions(protection.is_protected_role(role.id.as_i64(), &role.slug)),
            })
            .collect();

        Ok(GridScreen {
            declaration,
            rows,
            total: page.total,
            page: query.page,
            per_page: query.per_page,
        })
    }

    /// Returns the detail view of one role with its permission tree.
    pub async fn detail_screen(&self, role_id: RoleId) -> AppResult<DetailScreen> {
        let role = self.find(role_id).await?;
        let nodes = self.permission_nodes.all_nodes().await?;

        let selection = if self
            .config
            .protection()
            .is_administrator_slug(&role.slug)
        {
            TreeSelection::All
        } else {
            TreeSelection::ids(role.permission_ids.iter().copied())
        };

        let declaration = role_detail(
            &self.config,
            role_id.as_i64(),
            &role.slug,
            build_tree(&nodes, &selection),
        );
        let values = declaration.render(&role.to_screen_values());

        Ok(DetailScreen {
            declaration,
            values,
        })
    }

    /// Validates and persists a submitted role form, then drops the cached
    /// menu once.
    pub async fn save(&self, mode: FormMode, submission: FormSubmission) -> AppResult<RoleRecord> {
        let existing = self.existing(mode).await?;
        let declaration = self.declaration(mode, existing.as_ref()).await?;
        self.validator.validate(&declaration, &submission).await?;

        let data_scope = match submission.id("data_scope")? {
            Some(value) => DataScope::from_storage(value)?,
            None => existing
                .as_ref()
                .map(|role| role.data_scope)
                .unwrap_or_default(),
        };

        let menu_ids = if self.config.role_bind_menu() {
            Some(submission.ids("menus")?)
        } else {
            None
        };

        let draft = RoleDraft {
            slug: submission.text_or_empty("slug").trim().to_owned(),
            name: submission.text_or_empty("name").trim().to_owned(),
            data_scope,
            permission_ids: submission.ids("permissions")?,
            menu_ids,
        };

        let role = match existing {
            None => self.roles.create_role(draft).await?,
            Some(existing) => self.roles.update_role(existing.id, draft).await?,
        };

        info!(
            role_id = %role.id,
            slug = %role.slug,
            created = mode.is_creating(),
            "saved role"
        );

        if let Err(error) = self.menu_cache.invalidate().await {
            warn!(
                role_id = %role.id,
                error = %error,
                "failed to invalidate cached menu after role save"
            );
        }

        Ok(role)
    }

    /// Deletes a role unless it is the administrator role.
    pub async fn delete(&self, role_id: RoleId) -> AppResult<()> {
        let role = self.find(role_id).await?;

        if self
            .config
            .protection()
            .is_protected_role(role_id.as_i64(), &role.slug)
        {
            return Err(AppError::Forbidden(format!(
                "role '{}' is protected and cannot be deleted",
                role.slug
            )));
        }

        self.roles.delete_role(role_id).await?;

        info!(role_id = %role_id, slug = %role.slug, "deleted role");
        Ok(())
    }

    async fn declaration(
        &self,
        mode: FormMode,
        existing: Option<&RoleRecord>,
    ) -> AppResult<FormDeclaration> {
        let permission_nodes = self.permission_nodes.all_nodes().await?;
        let menu_nodes = if self.config.role_bind_menu() {
            self.menu_nodes.all_nodes().await?
        } else {
            Vec::new()
        };

        role_form(
            &self.config,
            mode,
            existing.map(|role| role.slug.as_str()),
            permission_nodes,
            menu_nodes,
        )
    }

    async fn existing(&self, mode: FormMode) -> AppResult<Option<RoleRecord>> {
        match mode.record_id() {
            None => Ok(None),
            Some(id) => self.find(RoleId::new(id)).await.map(Some),
        }
    }

    async fn find(&self, role_id: RoleId) -> AppResult<RoleRecord> {
        self.roles
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }
}

#[cfg(test)]
mod tests;
