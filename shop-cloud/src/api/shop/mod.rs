//! Shop and shop-permission routes

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shop", get(handler::search))
        .route("/shop/users", get(handler::users))
        .route("/shop/permission", put(handler::save_permission))
        .route(
            "/shop/permission/{username}",
            get(handler::permission).delete(handler::delete_permission),
        )
        .route(
            "/shop/{id}",
            get(handler::info)
                .put(handler::update)
                .delete(handler::delete),
        )
}
