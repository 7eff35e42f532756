use std::time::{Duration, Instant};

use crate::models::chat::ConversationTurn;

/// Rolling conversation history of one user name
#[derive(Debug, Clone)]
pub struct History {
    /// Chronological, oldest first
    pub turns: Vec<ConversationTurn>,

    /// Last successful commit (or creation), for idle eviction
    pub last_activity: Instant,
}

impl History {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            last_activity: Instant::now(),
        }
    }

    /// Replace the stored turns with `turns`, keeping only the newest `max_turns`.
    pub fn commit(&mut self, mut turns: Vec<ConversationTurn>, max_turns: usize) {
        if turns.len() > max_turns {
            turns.drain(..turns.len() - max_turns);
        }
        self.turns = turns;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn is_idle(&self, ttl: Duration) -> bool {
        self.last_activity.elapsed() >= ttl
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
