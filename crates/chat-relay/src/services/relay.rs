use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::models::chat::{ChatRequest, ChatResponse, ConversationTurn};
use crate::utils::error::RelayError;

use super::completion_client::CompletionProvider;
use super::conversation::{MemoryStore, PromptBuilder};

/// Relays one chat turn to the completion API and keeps the rolling
/// per-user history.
pub struct ChatRelay {
    store: MemoryStore,
    provider: Arc<dyn CompletionProvider>,
    prompts: PromptBuilder,
    max_turns: usize,
}

impl ChatRelay {
    pub fn new(
        store: MemoryStore,
        provider: Arc<dyn CompletionProvider>,
        prompts: PromptBuilder,
        max_turns: usize,
    ) -> Self {
        Self {
            store,
            provider,
            prompts,
            max_turns: max_turns.max(1),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Never fails: upstream and parse errors come back as `ChatResponse::Error`.
    pub async fn handle_chat(&self, request: ChatRequest) -> ChatResponse {
        let start_time = Instant::now();

        match self.relay(&request).await {
            Ok(reply) => {
                info!(
                    "Chat relayed: user={}, message_len={}, reply_len={}, elapsed={}ms",
                    request.user_name,
                    request.message.len(),
                    reply.len(),
                    start_time.elapsed().as_millis()
                );
                ChatResponse::Reply { reply }
            }
            Err(e) => {
                warn!("Chat relay failed for user={}: {}", request.user_name, e);
                ChatResponse::Error { error: e.to_string() }
            }
        }
    }

    async fn relay(&self, request: &ChatRequest) -> Result<String, RelayError> {
        // Held until commit: same-user requests are serialized.
        let turn = self.store.lock(&request.user_name).await;

        let instruction = self
            .prompts
            .system_instruction(&request.user_name, &request.personality);

        let mut working = turn.turns();
        working.push(ConversationTurn::user(request.message.clone()));

        let mut messages = Vec::with_capacity(working.len() + 1);
        messages.push(ConversationTurn::system(instruction));
        messages.extend(working.iter().cloned());

        debug!(
            "Prompt for {}: {} history turns + new message",
            request.user_name,
            working.len() - 1
        );

        let reply = self.provider.complete(&messages).await?;

        working.push(ConversationTurn::assistant(reply.clone()));
        turn.commit(working, self.max_turns);

        Ok(reply)
    }
}
