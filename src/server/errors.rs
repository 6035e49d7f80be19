use axum::http::StatusCode;
use axum::response::{ IntoResponse, Response };
use axum::Json;
use log::{ error, warn };

use crate::llm::LlmError;
use crate::models::relay::ErrorReply;
use crate::relay::RelayError;

pub(super) const INVALID_REQUEST: &str = "Invalid request format";
pub(super) const BODY_TOO_LARGE: &str = "Request body too large";

pub(super) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorReply::new(message))).into_response()
}

pub(super) fn bad_request_response(message: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, message)
}

/// Status code and client-facing message for a failed relay call. Upstream
/// details stay in the server log.
pub fn classify(err: &RelayError) -> (StatusCode, &'static str) {
    match err {
        RelayError::MissingPrompt => (StatusCode::BAD_REQUEST, "Prompt is required"),
        RelayError::Llm(llm) =>
            match llm {
                LlmError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "Request timeout - please try again"),
                LlmError::RateLimited =>
                    (StatusCode::TOO_MANY_REQUESTS, "API rate limit exceeded - please wait a moment"),
                LlmError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "API authentication failed"),
                LlmError::BadRequest(_) => (StatusCode::BAD_REQUEST, INVALID_REQUEST),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong with the AI service"),
            }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, message) = classify(&self);
        if status.is_server_error() {
            error!("Relay failed ({}): {}", status, self);
        } else {
            warn!("Relay rejected request ({}): {}", status, self);
        }
        error_response(status, message)
    }
}
