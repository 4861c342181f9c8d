//! Master data API, one router per module

mod handler;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::services::{MasterModule, MasterService};
use crate::state::AppState;

pub fn router<M: MasterModule>(service: Arc<MasterService<M>>) -> Router<AppState> {
    Router::new().nest(M::ROUTE, routes::<M>().with_state(service))
}

fn routes<M: MasterModule>() -> Router<Arc<MasterService<M>>> {
    Router::new()
        .route(
            "/",
            get(handler::search::<M>)
                .post(handler::create::<M>)
                .delete(handler::delete_by_guids::<M>),
        )
        .route("/bulk", post(handler::bulk::<M>))
        .route("/list", get(handler::list::<M>))
        .route("/code/{code}", get(handler::info_by_code::<M>))
        .route(
            "/{id}",
            get(handler::info::<M>)
                .put(handler::update::<M>)
                .delete(handler::delete::<M>),
        )
}
