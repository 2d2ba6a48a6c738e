use sqlx::PgPool;
use warden_application::{AccountAdminService, MenuService, RoleAdminService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub account_admin_service: AccountAdminService,
    pub role_admin_service: RoleAdminService,
    pub menu_service: MenuService,
    pub postgres_pool: Option<PgPool>,
    pub redis_client: Option<redis::Client>,
}
