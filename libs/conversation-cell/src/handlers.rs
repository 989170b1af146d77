use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use futures::FutureExt;
use tracing::{debug, error};

use shared_models::error::AppError;

use crate::models::{SessionParameters, TurnReply, WebhookRequest, WebhookResponse};
use crate::state::AppState;

/// Fulfillment webhook. Only an unreadable body is answered with an error
/// status; anything that goes wrong while handling the turn becomes the
/// generic apology with no parameter changes.
#[axum::debug_handler]
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, AppError> {
    let request: WebhookRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::MalformedRequest(e.to_string()))?;

    let params = SessionParameters::from(request);
    debug!("Webhook turn received");

    let response = guard_turn(state.dispatcher.handle_turn(params)).await;

    Ok(Json(response))
}

/// Runs a turn to completion, turning an error or a panic into the apology.
pub async fn guard_turn<F>(turn: F) -> WebhookResponse
where
    F: Future<Output = Result<TurnReply, AppError>>,
{
    match AssertUnwindSafe(turn).catch_unwind().await {
        Ok(Ok(reply)) => WebhookResponse::from(reply),
        Ok(Err(e)) => {
            error!("Turn failed: {}", e);
            WebhookResponse::apology()
        }
        Err(_) => {
            error!("Turn handler panicked");
            WebhookResponse::apology()
        }
    }
}
