//! Conversation memory management module
//!
//! Provides per-user rolling history with:
//! - Per-user turn locking over a DashMap, lock-free reads of committed turns
//! - Idle eviction (lazy and swept)
//! - System prompt building

mod prompt;
mod store;
pub mod types;

pub use prompt::PromptBuilder;
pub use store::{MemoryStore, TurnGuard};
pub use types::History;
