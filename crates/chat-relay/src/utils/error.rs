use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures of one relay round-trip. The `Display` text is what the caller
/// receives in the `error` field.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Groq API hatası: {status} - {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("AI yanıtı işlenemedi: {0}")]
    UpstreamParse(String),

    #[error("Groq API'ye ulaşılamadı: {0}")]
    UpstreamUnreachable(String),
}

/// Request-level faults rejected before the relay runs.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            },
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
