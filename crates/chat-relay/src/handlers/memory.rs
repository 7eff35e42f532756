use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::models::chat::{HistoryView, MemoryReset};
use crate::services::conversation::MemoryStore;

/// `GET /memory/{user_name}`
pub async fn get_history(
    State(store): State<MemoryStore>,
    Path(user_name): Path<String>,
) -> Json<HistoryView> {
    let turns = store.snapshot(&user_name);
    Json(HistoryView { user_name, turns })
}

/// `DELETE /memory/{user_name}`
pub async fn reset_history(
    State(store): State<MemoryStore>,
    Path(user_name): Path<String>,
) -> Json<MemoryReset> {
    let removed = store.remove(&user_name);
    info!("Memory reset for user={} (had history: {})", user_name, removed);

    Json(MemoryReset {
        success: true,
        removed,
        message: "Hafıza temizlendi!".to_string(),
    })
}
