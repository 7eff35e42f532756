use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::models::chat::ConversationTurn;
use super::types::History;

/// Per-user entry: the turn lock serializes relay cycles, the committed
/// history sits behind a short-lived sync lock so readers never wait on
/// an upstream call.
#[derive(Default)]
struct UserSlot {
    turn: Arc<Mutex<()>>,
    history: RwLock<History>,
}

type Slot = Arc<UserSlot>;

/// Exclusive right to run one relay cycle for a user name.
/// Dropping it without [`commit`](TurnGuard::commit) leaves the history as it was.
pub struct TurnGuard {
    slot: Slot,
    _turn: OwnedMutexGuard<()>,
}

impl TurnGuard {
    /// Committed turns at the time of the call
    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.slot.history.read().turns.clone()
    }

    pub fn commit(&self, turns: Vec<ConversationTurn>, max_turns: usize) {
        self.slot.history.write().commit(turns, max_turns);
    }
}

/// Process-wide per-user conversation memory.
///
/// A request holds its user's [`TurnGuard`] for the whole read, upstream
/// call and commit, so two requests for the same name run one after the
/// other while different names never contend.
#[derive(Clone)]
pub struct MemoryStore {
    storage: Arc<DashMap<String, Slot>>,
    idle_ttl: Option<Duration>,
}

impl MemoryStore {
    pub fn new(idle_ttl: Option<Duration>) -> Self {
        info!("Initializing memory store (idle ttl: {:?})", idle_ttl);
        Self {
            storage: Arc::new(DashMap::new()),
            idle_ttl,
        }
    }

    fn slot(&self, user_name: &str) -> Slot {
        if let Some(entry) = self.storage.get(user_name) {
            return entry.value().clone();
        }
        self.storage
            .entry(user_name.to_string())
            .or_default()
            .value()
            .clone()
    }

    /// Take the turn lock of `user_name`, creating an empty history if absent.
    /// An idle-expired history is cleared before the guard is handed out.
    pub async fn lock(&self, user_name: &str) -> TurnGuard {
        let slot = self.slot(user_name);
        let turn = slot.turn.clone().lock_owned().await;

        if let Some(ttl) = self.idle_ttl {
            let mut history = slot.history.write();
            if !history.is_empty() && history.is_idle(ttl) {
                debug!("History of {} idle for {:?}, starting over", user_name, ttl);
                history.turns.clear();
            }
        }

        TurnGuard { slot, _turn: turn }
    }

    /// Last committed turns; empty for unknown or expired users.
    /// Does not wait for a relay cycle in progress.
    pub fn snapshot(&self, user_name: &str) -> Vec<ConversationTurn> {
        let slot = match self.storage.get(user_name) {
            Some(entry) => entry.value().clone(),
            None => return Vec::new(),
        };

        let history = slot.history.read();
        match self.idle_ttl {
            Some(ttl) if history.is_idle(ttl) => Vec::new(),
            _ => history.turns.clone(),
        }
    }

    /// Forget a user. Returns whether anything was stored.
    pub fn remove(&self, user_name: &str) -> bool {
        self.storage.remove(user_name).is_some()
    }

    /// Number of user names currently held
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Drop idle histories that no request is using.
    /// Returns number of histories removed
    pub fn cleanup_expired(&self) -> usize {
        let Some(ttl) = self.idle_ttl else {
            return 0;
        };

        let start_len = self.storage.len();
        self.storage.retain(|_, slot: &mut Slot| {
            // Someone outside the map still holds the slot: in flight.
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            !slot.history.read().is_idle(ttl)
        });
        let count = start_len.saturating_sub(self.storage.len());

        if count > 0 {
            info!("Cleaned up {} idle histories", count);
        }

        count
    }

    /// Periodically run [`cleanup_expired`](Self::cleanup_expired).
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                store.cleanup_expired();
            }
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(None)
    }
}
