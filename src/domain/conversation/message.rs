//! Message entity for chat topics.
//!
//! Messages are immutable records of one exchange turn. Each has a role,
//! content, owning topic and creation time.

use crate::domain::foundation::{DomainError, MessageId, Timestamp, TopicId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Storage representation (`user` / `assistant`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(DomainError::validation(
                "role",
                format!("Unknown message role: {}", other),
            )),
        }
    }
}

/// An immutable message within a chat topic.
///
/// # Invariants
///
/// - `content` is non-empty (validated at construction)
/// - `created_at` is set at construction and never changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    id: MessageId,
    topic_id: TopicId,
    role: MessageRole,
    content: String,
    created_at: Timestamp,
}

impl ChatMessage {
    /// Creates a user message.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if content is empty
    pub fn user(topic_id: TopicId, content: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(topic_id, MessageRole::User, content)
    }

    /// Creates an assistant message.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if content is empty
    pub fn assistant(topic_id: TopicId, content: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(topic_id, MessageRole::Assistant, content)
    }

    fn new(
        topic_id: TopicId,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::validation(
                "content",
                "Message content cannot be empty",
            ));
        }

        Ok(Self {
            id: MessageId::new(),
            topic_id,
            role,
            content,
            created_at: Timestamp::now(),
        })
    }

    /// Reconstitutes a message from persistence (no validation).
    pub fn reconstitute(
        id: MessageId,
        topic_id: TopicId,
        role: MessageRole,
        content: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            topic_id,
            role,
            content,
            created_at,
        }
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn user_message_keeps_content_and_topic() {
        let topic = TopicId::new();
        let msg = ChatMessage::user(topic, "tambah produk").unwrap();

        assert_eq!(msg.role(), MessageRole::User);
        assert_eq!(msg.content(), "tambah produk");
        assert_eq!(msg.topic_id(), &topic);
    }

    #[test]
    fn blank_content_is_rejected() {
        let err = ChatMessage::assistant(TopicId::new(), "  \n").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn role_round_trips_through_storage_string() {
        for role in [MessageRole::User, MessageRole::Assistant] {
            assert_eq!(role.as_str().parse::<MessageRole>().unwrap(), role);
        }
        assert!("system".parse::<MessageRole>().is_err());
    }
}
