//! Master sync API: activity feed across modules and last-write status

mod handler;

use axum::{Router, routing::get};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/master-sync", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::activity))
        .route("/list", get(handler::activity_list))
        .route("/status", get(handler::status))
}
