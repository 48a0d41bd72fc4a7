//! Conversation roles and prior turns.
//!
//! A research task can be seeded with earlier user/assistant exchanges. Only
//! the text of those turns is kept; everything else about a conversation
//! lives server-side behind the linkage token.

use serde::{Deserialize, Serialize};

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions
    System,
}

/// A prior turn supplied by the caller when starting a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

impl HistoryMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Whether this turn may be replayed to the model. System turns and
    /// blank content are not.
    pub fn is_replayable(&self) -> bool {
        matches!(self.role, Role::User | Role::Assistant) && !self.content.trim().is_empty()
    }
}
