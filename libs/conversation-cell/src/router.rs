use std::sync::Arc;

use axum::{routing::post, Router};

use crate::handlers;
use crate::state::AppState;

pub fn webhook_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::webhook))
        .with_state(state)
}
