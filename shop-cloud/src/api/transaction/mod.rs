//! Transaction API, one router per transaction kind

mod handler;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::services::{TransactionModule, TransactionService};
use crate::state::AppState;

pub fn router<M: TransactionModule>(service: Arc<TransactionService<M>>) -> Router<AppState> {
    Router::new().nest(M::ROUTE, routes::<M>().with_state(service))
}

fn routes<M: TransactionModule>() -> Router<Arc<TransactionService<M>>> {
    Router::new()
        .route(
            "/",
            get(handler::search::<M>)
                .post(handler::create::<M>)
                .delete(handler::delete_by_guids::<M>),
        )
        .route("/bulk", post(handler::bulk::<M>))
        .route("/list", get(handler::list::<M>))
        .route("/docno/{docno}", get(handler::info_by_docno::<M>))
        .route(
            "/{id}",
            get(handler::info::<M>)
                .put(handler::update::<M>)
                .delete(handler::delete::<M>),
        )
}
