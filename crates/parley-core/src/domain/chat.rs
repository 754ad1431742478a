//! Chat message types as seen by the controller.
//!
//! Messages are owned by the external chat session. The controller only
//! reads them; content may still be growing while the session is generating.

use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user.
    User,
    /// Message produced by the assistant.
    Assistant,
}

impl MessageRole {
    /// Wire label (`"user"` or `"assistant"`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message of the chat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Stable identifier, unique within the session.
    pub id: String,
    /// Who wrote the message.
    pub role: MessageRole,
    /// Text content. Mutates while streaming, immutable once finalized.
    pub content: String,
}

impl ChatMessage {
    /// Create a message with the given role.
    pub fn new(id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, MessageRole::Assistant, content)
    }

    /// Create a user message.
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(id, MessageRole::User, content)
    }

    /// Whether the assistant wrote this message.
    #[must_use]
    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }

    /// Content with surrounding whitespace removed.
    #[must_use]
    pub fn trimmed(&self) -> &str {
        self.content.trim()
    }

    /// Length of the trimmed content in characters (not bytes).
    #[must_use]
    pub fn spoken_len(&self) -> usize {
        self.trimmed().chars().count()
    }
}
