use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::Value;
use warden_application::{FormSubmission, GridRequest};
use warden_domain::{FormMode, RoleId};

use crate::dto::{
    DetailScreenResponse, FormQueryParams, FormScreenResponse, GridQueryParams,
    GridScreenResponse, RoleResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Query(params): Query<GridQueryParams>,
) -> ApiResult<Json<GridScreenResponse>> {
    let screen = state
        .role_admin_service
        .grid_screen(GridRequest::try_from(params)?)
        .await?;

    Ok(Json(GridScreenResponse::from(screen)))
}

pub async fn role_form_handler(
    State(state): State<AppState>,
    Query(params): Query<FormQueryParams>,
) -> ApiResult<Json<FormScreenResponse>> {
    let screen = state
        .role_admin_service
        .form_screen(FormMode::try_from(params)?)
        .await?;

    Ok(Json(FormScreenResponse::from(screen)))
}

pub async fn role_detail_handler(
    State(state): State<AppState>,
    Path(role_id): Path<i64>,
) -> ApiResult<Json<DetailScreenResponse>> {
    let screen = state
        .role_admin_service
        .detail_screen(RoleId::new(role_id))
        .await?;

    Ok(Json(DetailScreenResponse::from(screen)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let role = state
        .role_admin_service
        .save(FormMode::Creating, FormSubmission::from_json(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state
        .role_admin_service
        .save(
            FormMode::Editing(role_id),
            FormSubmission::from_json(payload)?,
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.role_admin_service.delete(RoleId::new(role_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
