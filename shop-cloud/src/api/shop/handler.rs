use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use shared::ApiResponse;
use shared::models::{Document, Shop, ShopMembership, ShopUser};

use crate::api::query::{self, Params};
use crate::auth::AuthIdentity;
use crate::error::ServiceResult;
use crate::state::AppState;

/// GET /shop?q=&page=&limit=
pub async fn search(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthIdentity>,
    Query(params): Query<Params>,
) -> ServiceResult<ApiResponse<Vec<ShopMembership>>> {
    let (shops, pagination) = state
        .services
        .shop
        .search(&auth.username, &query::pageable(&params))
        .await?;
    Ok(ApiResponse::paged(shops, pagination))
}

pub async fn info(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthIdentity>,
    Path(id): Path<String>,
) -> ServiceResult<ApiResponse<Document<Shop>>> {
    let shop = state.services.shop.info(&auth, &id).await?;
    Ok(ApiResponse::success(shop))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthIdentity>,
    Path(id): Path<String>,
    Json(shop): Json<Shop>,
) -> ServiceResult<ApiResponse<()>> {
    state.services.shop.update(&auth, &id, shop).await?;
    Ok(ApiResponse::with_id(id))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthIdentity>,
    Path(id): Path<String>,
) -> ServiceResult<ApiResponse<()>> {
    state.services.shop.delete(&auth, &id).await?;
    Ok(ApiResponse::with_id(id))
}

/// GET /shop/users
pub async fn users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthIdentity>,
) -> ServiceResult<ApiResponse<Vec<ShopUser>>> {
    let users = state.services.shop.users(&auth).await?;
    Ok(ApiResponse::success(users))
}

pub async fn permission(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthIdentity>,
    Path(username): Path<String>,
) -> ServiceResult<ApiResponse<ShopUser>> {
    let user = state.services.shop.permission(&auth, &username).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /shop/permission
pub async fn save_permission(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthIdentity>,
    Json(user): Json<ShopUser>,
) -> ServiceResult<ApiResponse<()>> {
    let username = user.username.clone();
    state.services.shop.save_permission(&auth, user).await?;
    Ok(ApiResponse::with_id(username))
}

pub async fn delete_permission(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthIdentity>,
    Path(username): Path<String>,
) -> ServiceResult<ApiResponse<()>> {
    state.services.shop.delete_permission(&auth, &username).await?;
    Ok(ApiResponse::with_id(username))
}
