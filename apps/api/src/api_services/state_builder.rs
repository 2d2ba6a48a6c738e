use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;
use warden_application::{
    AccountAdminService, AccountRepository, AdminConfig, FormValidator, MenuCache,
    MenuNodeRepository, MenuService, PasswordHasher, PermissionNodeRepository,
    RoleAdminService, RoleRepository, UniquenessProbe,
};
use warden_core::AppError;
use warden_infrastructure::{
    Argon2PasswordHasher, InMemoryMenuCache, PostgresAccountRepository,
    PostgresMenuNodeRepository, PostgresPermissionNodeRepository, PostgresRoleRepository,
    PostgresUniquenessProbe, RedisMenuCache,
};

use crate::api_config::ApiConfig;
use crate::state::AppState;

use super::redis::build_redis_client;

/// Port implementations the administration services are built from.
pub struct AdminPorts {
    pub accounts: Arc<dyn AccountRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub permission_nodes: Arc<dyn PermissionNodeRepository>,
    pub menu_nodes: Arc<dyn MenuNodeRepository>,
    pub menu_cache: Arc<dyn MenuCache>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub uniqueness_probe: Arc<dyn UniquenessProbe>,
}

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let redis_client = config
        .redis_url
        .as_deref()
        .map(build_redis_client)
        .transpose()?;

    let tables = config.admin.tables();
    let menu_cache: Arc<dyn MenuCache> = match redis_client.clone() {
        Some(client) => {
            info!(prefix = %config.menu_cache_prefix, "menu cache backed by redis");
            Arc::new(RedisMenuCache::new(client, &config.menu_cache_prefix))
        }
        None => Arc::new(InMemoryMenuCache::new()),
    };

    let ports = AdminPorts {
        accounts: Arc::new(PostgresAccountRepository::new(pool.clone(), tables.clone())?),
        roles: Arc::new(PostgresRoleRepository::new(pool.clone(), tables.clone())?),
        permission_nodes: Arc::new(PostgresPermissionNodeRepository::new(pool.clone(), tables)?),
        menu_nodes: Arc::new(PostgresMenuNodeRepository::new(pool.clone(), tables)?),
        menu_cache,
        password_hasher: Arc::new(Argon2PasswordHasher::new()),
        uniqueness_probe: Arc::new(
            PostgresUniquenessProbe::new()
                .with_connection(config.admin.connection(), pool.clone()),
        ),
    };

    Ok(assemble_state(&config.admin, ports, Some(pool), redis_client))
}

pub fn assemble_state(
    admin: &AdminConfig,
    ports: AdminPorts,
    postgres_pool: Option<PgPool>,
    redis_client: Option<redis::Client>,
) -> AppState {
    let validator = FormValidator::new(ports.uniqueness_probe);

    AppState {
        account_admin_service: AccountAdminService::new(
            admin.clone(),
            ports.accounts,
            ports.roles.clone(),
            ports.permission_nodes.clone(),
            ports.password_hasher,
            validator.clone(),
        ),
        role_admin_service: RoleAdminService::new(
            admin.clone(),
            ports.roles,
            ports.permission_nodes,
            ports.menu_nodes.clone(),
            ports.menu_cache.clone(),
            validator,
        ),
        menu_service: MenuService::new(ports.menu_nodes, ports.menu_cache),
        postgres_pool,
        redis_client,
    }
}
