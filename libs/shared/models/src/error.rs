use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Reply text used whenever a turn cannot be processed at all.
pub const GENERIC_APOLOGY: &str =
    "I'm sorry, something went wrong on our side. Please try again in a moment.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

/// Fulfillment body carrying only the generic apology and no parameter updates.
pub fn apology_body() -> Value {
    json!({
        "fulfillmentResponse": {
            "messages": [
                { "text": { "text": [GENERIC_APOLOGY] } }
            ]
        }
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MalformedRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        tracing::error!("Error: {}: {}", status, self);

        (status, Json(apology_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_request_maps_to_500() {
        let response = AppError::MalformedRequest("expected value".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_apology_body_has_single_message() {
        let body = apology_body();
        assert_eq!(
            body["fulfillmentResponse"]["messages"][0]["text"]["text"][0],
            GENERIC_APOLOGY
        );
        assert!(body.get("sessionInfo").is_none());
    }
}
