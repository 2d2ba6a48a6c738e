use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::Value;
use warden_application::{FormSubmission, GridRequest};
use warden_domain::{AccountId, FormMode};

use crate::dto::{
    AccountResponse, DetailScreenResponse, FormQueryParams, FormScreenResponse, GridQueryParams,
    GridScreenResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_accounts_handler(
    State(state): State<AppState>,
    Query(params): Query<GridQueryParams>,
) -> ApiResult<Json<GridScreenResponse>> {
    let screen = state
        .account_admin_service
        .grid_screen(GridRequest::try_from(params)?)
        .await?;

    Ok(Json(GridScreenResponse::from(screen)))
}

pub async fn account_form_handler(
    State(state): State<AppState>,
    Query(params): Query<FormQueryParams>,
) -> ApiResult<Json<FormScreenResponse>> {
    let screen = state
        .account_admin_service
        .form_screen(FormMode::try_from(params)?)
        .await?;

    Ok(Json(FormScreenResponse::from(screen)))
}

pub async fn account_detail_handler(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> ApiResult<Json<DetailScreenResponse>> {
    let screen = state
        .account_admin_service
        .detail_screen(AccountId::new(account_id))
        .await?;

    Ok(Json(DetailScreenResponse::from(screen)))
}

pub async fn create_account_handler(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult<(StatusCode, Json<AccountResponse>)> {
    let account = state
        .account_admin_service
        .save(FormMode::Creating, FormSubmission::from_json(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(account))))
}

pub async fn update_account_handler(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<AccountResponse>> {
    let account = state
        .account_admin_service
        .save(
            FormMode::Editing(account_id),
            FormSubmission::from_json(payload)?,
        )
        .await?;

    Ok(Json(AccountResponse::from(account)))
}

pub async fn delete_account_handler(
    State(state): State<AppState>,
    Path(account_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .account_admin_service
        .delete(AccountId::new(account_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
