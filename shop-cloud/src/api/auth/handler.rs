use axum::{Json, extract::State, http::StatusCode};
use shared::ApiResponse;
use shared::models::{LoginRequest, LoginResponse, RegisterShopRequest};

use crate::error::ServiceResult;
use crate::modules::employee;
use crate::state::AppState;

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ServiceResult<ApiResponse<LoginResponse>> {
    let resp = employee::login(&state.services.employee, &state.jwt_secret, &req).await?;
    Ok(ApiResponse::success(resp))
}

/// POST /register: new shop plus its owner, answered with the owner's token
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterShopRequest>,
) -> ServiceResult<(StatusCode, ApiResponse<LoginResponse>)> {
    let resp = state.services.shop.register(&state.jwt_secret, req).await?;
    Ok((StatusCode::CREATED, ApiResponse::created_with(resp.shopid.clone(), resp)))
}
