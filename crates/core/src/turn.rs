//! Conversation turn value objects.
//!
//! A turn is one `{role, content}` entry in the conversation history that
//! accompanies an inbound request. Order is recency-relevant: the router
//! keeps only the most recent window and drops older turns outright.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
}

impl Role {
    /// Label used when rendering a turn into the classifier input block.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// A single turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who authored this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Render this turn as a `Role: content` line.
    pub fn render(&self) -> String {
        format!("{}: {}", self.role.label(), self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_turn() {
        let turn = Turn::user("Hello there");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content, "Hello there");
    }

    #[test]
    fn render_uses_role_label() {
        assert_eq!(Turn::user("hi").render(), "User: hi");
        assert_eq!(Turn::assistant("hello").render(), "Assistant: hello");
    }

    #[test]
    fn serialization_roundtrip() {
        let turn = Turn::assistant("Sure, I can help.");
        let json = serde_json::to_string(&turn).unwrap();
        let back: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, Role::Assistant);
        assert_eq!(back.content, "Sure, I can help.");
    }
}
