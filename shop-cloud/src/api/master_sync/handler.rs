//! Master sync handlers

use std::collections::BTreeMap;

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde_json::{Map, Value};
use shared::ApiResponse;

use crate::api::query::{self, Params};
use crate::auth::AuthIdentity;
use crate::error::ServiceResult;
use crate::state::AppState;

/// GET /master-sync?lastupdate=&module=&action=&filter=&page=&limit=
pub async fn activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthIdentity>,
    Query(params): Query<Params>,
) -> ServiceResult<ApiResponse<Map<String, Value>>> {
    let sync = query::sync_query(&params)?;
    let (data, pagination) = state
        .master_sync
        .activity(&auth.shop_id, &sync, &query::pageable(&params))
        .await?;
    Ok(ApiResponse::paged(data, pagination))
}

/// GET /master-sync/list?lastupdate=&module=&action=&filter=&skip=&limit=
pub async fn activity_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthIdentity>,
    Query(params): Query<Params>,
) -> ServiceResult<ApiResponse<Map<String, Value>>> {
    let sync = query::sync_query(&params)?;
    let data = state
        .master_sync
        .activity_step(&auth.shop_id, &sync, &query::pageable_step(&params))
        .await?;
    Ok(ApiResponse::success(data))
}

/// GET /master-sync/status
pub async fn status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthIdentity>,
) -> ServiceResult<Json<BTreeMap<String, i64>>> {
    Ok(Json(state.master_sync.status(&auth.shop_id).await?))
}
