use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::services::conversation::MemoryStore;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
    active_users: usize,
}

pub async fn health_check(State(store): State<MemoryStore>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            active_users: store.len(),
        }),
    )
}

pub async fn readiness_check() -> StatusCode {
    StatusCode::OK
}
