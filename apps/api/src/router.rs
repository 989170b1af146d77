use std::sync::Arc;

use axum::Router;

use conversation_cell::router::webhook_routes;
use conversation_cell::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(webhook_routes(state))
}
