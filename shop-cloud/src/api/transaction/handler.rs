//! Transaction handlers, generic over the transaction kind

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use shared::models::{Document, Transaction};
use shared::{ApiResponse, BulkResponse};

use crate::api::query::{self, Params};
use crate::auth::AuthIdentity;
use crate::error::ServiceResult;
use crate::services::{TransactionModule, TransactionService};

type Svc<M> = State<Arc<TransactionService<M>>>;

pub async fn bulk<M: TransactionModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Json(items): Json<Vec<Transaction>>,
) -> ServiceResult<Json<BulkResponse>> {
    let result = svc
        .save_in_batch(&auth.shop_id, &auth.username, items)
        .await?;
    Ok(Json(result.into()))
}

pub async fn search<M: TransactionModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Query(params): Query<Params>,
) -> ServiceResult<ApiResponse<Vec<Document<Transaction>>>> {
    let (docs, pagination) = svc
        .search(&auth.shop_id, &[], &query::pageable(&params))
        .await?;
    Ok(ApiResponse::paged(docs, pagination))
}

pub async fn list<M: TransactionModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Query(params): Query<Params>,
) -> ServiceResult<ApiResponse<Vec<Document<Transaction>>>> {
    let (docs, total) = svc
        .search_step(
            &auth.shop_id,
            params.get("lang").map(String::as_str),
            &[],
            &query::pageable_step(&params),
        )
        .await?;
    Ok(ApiResponse::with_total(docs, total))
}

/// Responds `{success, id, data: {docno}}`
pub async fn create<M: TransactionModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Json(payload): Json<Transaction>,
) -> ServiceResult<(StatusCode, ApiResponse<Value>)> {
    let (id, doc_no) = svc.create(&auth.shop_id, &auth.username, payload).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::created_with(id, json!({ "docno": doc_no })),
    ))
}

pub async fn info<M: TransactionModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Path(id): Path<String>,
) -> ServiceResult<ApiResponse<Document<Transaction>>> {
    Ok(ApiResponse::success(svc.info(&auth.shop_id, &id).await?))
}

pub async fn info_by_docno<M: TransactionModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Path(doc_no): Path<String>,
) -> ServiceResult<ApiResponse<Document<Transaction>>> {
    Ok(ApiResponse::success(
        svc.info_by_docno(&auth.shop_id, &doc_no).await?,
    ))
}

pub async fn update<M: TransactionModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Path(id): Path<String>,
    Json(payload): Json<Transaction>,
) -> ServiceResult<ApiResponse<()>> {
    svc.update(&auth.shop_id, &id, &auth.username, payload)
        .await?;
    Ok(ApiResponse::with_id(id))
}

pub async fn delete<M: TransactionModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Path(id): Path<String>,
) -> ServiceResult<ApiResponse<()>> {
    svc.delete(&auth.shop_id, &id, &auth.username).await?;
    Ok(ApiResponse::with_id(id))
}

pub async fn delete_by_guids<M: TransactionModule>(
    State(svc): Svc<M>,
    Extension(auth): Extension<AuthIdentity>,
    Json(guids): Json<Vec<String>>,
) -> ServiceResult<ApiResponse<()>> {
    svc.delete_by_guids(&auth.shop_id, &auth.username, &guids)
        .await?;
    Ok(ApiResponse::ok())
}
