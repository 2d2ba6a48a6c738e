//! Warden API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod seed;
mod state;

use tracing::{info, warn};
use warden_core::AppError;

use crate::api_config::{ApiCommand, ApiConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    if config.uses_custom_tables() {
        warn!(
            tables = ?config.admin.tables(),
            "admin tables differ from the migrated schema and must be provisioned separately"
        );
    }
    let pool = api_services::connect_and_migrate(&config.database_url).await?;

    match config.command {
        ApiCommand::Migrate => {
            info!("database migrations applied successfully");
            return Ok(());
        }
        ApiCommand::Seed => return seed::run(pool, &config).await,
        ApiCommand::Serve => {}
    }

    let app_state = api_services::build_app_state(pool, &config)?;
    let app = api_router::build_router(
        app_state,
        &config.frontend_url,
        config.admin.permission_enabled(),
    )?;

    let address = config.socket_address()?;
    info!(%address, "warden api listening");

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("server error: {error}")))
}
