use axum::Json;
use axum::extract::State;

use crate::dto::MenuResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn menu_handler(State(state): State<AppState>) -> ApiResult<Json<MenuResponse>> {
    let tree = state.menu_service.menu_tree().await?;

    Ok(Json(MenuResponse::from(tree)))
}
