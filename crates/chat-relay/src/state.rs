use std::sync::Arc;
use axum::extract::FromRef;

use crate::config::Settings;
use crate::services::conversation::MemoryStore;
use crate::services::ChatRelay;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<ChatRelay>,
    pub store: MemoryStore,
    pub settings: Arc<Settings>,
}

impl FromRef<AppState> for Arc<ChatRelay> {
    fn from_ref(state: &AppState) -> Self {
        state.relay.clone()
    }
}

impl FromRef<AppState> for MemoryStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}
