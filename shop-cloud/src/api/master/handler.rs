//! Master data handlers, generic over the module

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::models::Document;
use shared::{ApiResponse, BulkResponse};

use crate::api::query::{self, Params};
use crate::auth::AuthIdentity;
use crate::error::ServiceResult;
use crate::services::{MasterModule, MasterService};

type Svc<M> = State<Arc<MasterService<M>>>;

/// POST {route}/bulk
pub async fn bulk<M: MasterModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Json(items): Json<Vec<M::Model>>,
) -> ServiceResult<Json<BulkResponse>> {
    let result = svc
        .save_in_batch(&auth.shop_id, &auth.username, items)
        .await?;
    Ok(Json(result.into()))
}

/// GET {route}?q=&page=&limit=&sort=
pub async fn search<M: MasterModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Query(params): Query<Params>,
) -> ServiceResult<ApiResponse<Vec<Document<M::Model>>>> {
    let filters = query::module_filters(M::FILTERS, &params);
    let (docs, pagination) = svc
        .search(&auth.shop_id, &filters, &query::pageable(&params))
        .await?;
    Ok(ApiResponse::paged(docs, pagination))
}

/// GET {route}/list?q=&skip=&limit=&lang=
pub async fn list<M: MasterModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Query(params): Query<Params>,
) -> ServiceResult<ApiResponse<Vec<Document<M::Model>>>> {
    let filters = query::module_filters(M::FILTERS, &params);
    let (docs, total) = svc
        .search_step(
            &auth.shop_id,
            params.get("lang").map(String::as_str),
            &filters,
            &query::pageable_step(&params),
        )
        .await?;
    Ok(ApiResponse::with_total(docs, total))
}

pub async fn create<M: MasterModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Json(payload): Json<M::Model>,
) -> ServiceResult<(StatusCode, ApiResponse<()>)> {
    let id = svc.create(&auth.shop_id, &auth.username, payload).await?;
    Ok((StatusCode::CREATED, ApiResponse::with_id(id)))
}

pub async fn info<M: MasterModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Path(id): Path<String>,
) -> ServiceResult<ApiResponse<Document<M::Model>>> {
    let doc = svc.info(&auth.shop_id, &id).await?;
    Ok(ApiResponse::success(doc))
}

pub async fn info_by_code<M: MasterModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Path(code): Path<String>,
) -> ServiceResult<ApiResponse<Document<M::Model>>> {
    let doc = svc.info_by_code(&auth.shop_id, &code).await?;
    Ok(ApiResponse::success(doc))
}

pub async fn update<M: MasterModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<M::Model>,
) -> ServiceResult<ApiResponse<()>> {
    svc.update(&auth.shop_id, &id, &auth.username, payload)
        .await?;
    Ok(ApiResponse::with_id(id))
}

pub async fn delete<M: MasterModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Path(id): Path<String>,
) -> ServiceResult<ApiResponse<()>> {
    svc.delete(&auth.shop_id, &id, &auth.username).await?;
    Ok(ApiResponse::with_id(id))
}

/// DELETE {route} with a JSON array of guids
pub async fn delete_by_guids<M: MasterModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Json(guids): Json<Vec<String>>,
) -> ServiceResult<ApiResponse<()>> {
    svc.delete_by_guids(&auth.shop_id, &auth.username, &guids)
        .await?;
    Ok(ApiResponse::ok())
}
