use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::models::chat::{ChatRequest, ChatResponse};
use crate::services::ChatRelay;
use crate::utils::error::ApiError;

pub const MISSING_FIELDS: &str = "user_name ve message gerekli";

/// `POST /`
///
/// Relay outcomes (reply or upstream error) are always `200 OK`; only a
/// malformed or incomplete request body is rejected with `400`.
pub async fn chat_handler(
    State(relay): State<Arc<ChatRelay>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    if !request.is_complete() {
        return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
    }

    debug!(
        "Chat request: user={}, message_len={}, has_personality={}",
        request.user_name,
        request.message.len(),
        !request.personality.is_empty()
    );

    Ok(Json(relay.handle_chat(request).await))
}
