use serde::{Deserialize, Serialize};

// ===== CONVERSATION MODELS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a conversation, in the shape the completion API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

// ===== REQUEST MODELS =====

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub message: String,
    /// Replaces the default system prompt verbatim when non-empty
    #[serde(default)]
    pub personality: String,
}

impl ChatRequest {
    pub fn is_complete(&self) -> bool {
        !self.user_name.is_empty() && !self.message.is_empty()
    }
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Reply { reply: String },
    Error { error: String },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryView {
    pub user_name: String,
    pub turns: Vec<ConversationTurn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemoryReset {
    pub success: bool,
    pub removed: bool,
    pub message: String,
}
