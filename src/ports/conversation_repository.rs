//! Conversation repository port.
//!
//! Defines the contract for persisting chat topics and their messages.
//!
//! # Design
//!
//! - **Append-only messages**: messages are never updated or deleted
//! - **Pending state on the topic**: the pending action is written as a whole,
//!   replacing whatever was there

use crate::domain::conversation::{ChatMessage, ChatTopic, PendingAction};
use crate::domain::foundation::{DomainError, Timestamp, TopicId};
use async_trait::async_trait;

/// Repository port for chat topics and messages.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Save a new topic.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn create_topic(&self, topic: &ChatTopic) -> Result<(), DomainError>;

    /// Find a topic by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_topic(&self, id: &TopicId) -> Result<Option<ChatTopic>, DomainError>;

    /// Replace the topic's pending action.
    ///
    /// # Errors
    ///
    /// - `TopicNotFound` if the topic doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update_pending(&self, id: &TopicId, pending: &PendingAction)
        -> Result<(), DomainError>;

    /// Record activity on the topic.
    ///
    /// # Errors
    ///
    /// - `TopicNotFound` if the topic doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn touch_topic(&self, id: &TopicId, at: Timestamp) -> Result<(), DomainError>;

    /// Append a message to its topic.
    ///
    /// # Errors
    ///
    /// - `TopicNotFound` if the topic doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn append_message(&self, message: &ChatMessage) -> Result<(), DomainError>;

    /// The latest `limit` messages of a topic, oldest first.
    async fn recent_messages(
        &self,
        id: &TopicId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, DomainError>;
}
