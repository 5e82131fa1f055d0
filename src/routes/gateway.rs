//! Query gateway route: one parameterized path, the handler resolves the table.

use crate::handlers::gateway::{list, query};
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn gateway_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/db/:table", post(query).get(list))
        .with_state(state)
}
