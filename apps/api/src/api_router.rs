use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use warden_core::AppError;

use crate::handlers;
use crate::state::AppState;

mod cors;

/// Builds the HTTP surface. Role screens are mounted only when the
/// permission feature is on.
pub fn build_router(
    app_state: AppState,
    frontend_url: &str,
    permission_enabled: bool,
) -> Result<Router, AppError> {
    let account_routes = Router::new()
        .route(
            "/api/admin/accounts",
            get(handlers::accounts::list_accounts_handler)
                .post(handlers::accounts::create_account_handler),
        )
        .route(
            "/api/admin/accounts/form",
            get(handlers::accounts::account_form_handler),
        )
        .route(
            "/api/admin/accounts/{account_id}",
            get(handlers::accounts::account_detail_handler)
                .put(handlers::accounts::update_account_handler)
                .delete(handlers::accounts::delete_account_handler),
        );

    let role_routes = Router::new()
        .route(
            "/api/admin/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/api/admin/roles/form",
            get(handlers::roles::role_form_handler),
        )
        .route(
            "/api/admin/roles/{role_id}",
            get(handlers::roles::role_detail_handler)
                .put(handlers::roles::update_role_handler)
                .delete(handlers::roles::delete_role_handler),
        );

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/api/admin/menu", get(handlers::menu::menu_handler))
        .merge(account_routes);
    if permission_enabled {
        router = router.merge(role_routes);
    }

    Ok(router
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
