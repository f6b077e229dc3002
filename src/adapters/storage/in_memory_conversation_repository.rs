//! In-Memory Conversation Repository
//!
//! Stores topics and messages in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{ChatMessage, ChatTopic, MessageRole, PendingAction};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, TopicId};
use crate::ports::ConversationRepository;

/// In-memory storage for chat topics and messages
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationRepository {
    topics: Arc<RwLock<HashMap<TopicId, ChatTopic>>>,
    messages: Arc<RwLock<Vec<ChatMessage>>>,
    fail_assistant_appends: Arc<AtomicBool>,
    fail_next_pending_update: Arc<AtomicBool>,
}

impl InMemoryConversationRepository {
    /// Create a new in-memory repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Make appends of assistant messages fail (user messages still succeed).
    pub fn fail_assistant_appends(&self, fail: bool) {
        self.fail_assistant_appends.store(fail, Ordering::SeqCst);
    }

    /// Make the next `update_pending` call fail; later calls succeed again.
    pub fn fail_next_pending_update(&self) {
        self.fail_next_pending_update.store(true, Ordering::SeqCst);
    }

    /// All messages of a topic, oldest first.
    pub async fn messages_for(&self, id: &TopicId) -> Vec<ChatMessage> {
        self.messages
            .read()
            .await
            .iter()
            .filter(|m| m.topic_id() == id)
            .cloned()
            .collect()
    }

    /// Overwrites stored pending columns as if they had been written by an
    /// older release; decoding falls back to idle like the SQL adapter does.
    pub async fn put_raw_pending(
        &self,
        id: &TopicId,
        tag: Option<&str>,
        payload: Option<serde_json::Value>,
    ) -> Result<(), DomainError> {
        let pending = match PendingAction::from_storage(tag, payload) {
            Ok(pending) => pending,
            Err(err) => {
                tracing::warn!(topic_id = %id, error = %err, "Discarding undecodable pending action");
                PendingAction::Idle
            }
        };
        self.update_pending(id, &pending).await
    }
}

fn topic_not_found(id: &TopicId) -> DomainError {
    DomainError::new(ErrorCode::TopicNotFound, "Topic not found")
        .with_detail("topic_id", id.to_string())
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn create_topic(&self, topic: &ChatTopic) -> Result<(), DomainError> {
        self.topics.write().await.insert(*topic.id(), topic.clone());
        Ok(())
    }

    async fn find_topic(&self, id: &TopicId) -> Result<Option<ChatTopic>, DomainError> {
        Ok(self.topics.read().await.get(id).cloned())
    }

    async fn update_pending(
        &self,
        id: &TopicId,
        pending: &PendingAction,
    ) -> Result<(), DomainError> {
        if self.fail_next_pending_update.swap(false, Ordering::SeqCst) {
            return Err(DomainError::database(
                "Failed to update pending action",
                "simulated failure",
            ));
        }

        let mut topics = self.topics.write().await;
        let topic = topics.get_mut(id).ok_or_else(|| topic_not_found(id))?;

        // Storage replaces the columns wholesale; no transition check here.
        *topic = ChatTopic::reconstitute(
            *topic.id(),
            topic.owner().clone(),
            pending.clone(),
            topic.last_message_at().copied(),
            *topic.created_at(),
        );
        Ok(())
    }

    async fn touch_topic(&self, id: &TopicId, at: Timestamp) -> Result<(), DomainError> {
        let mut topics = self.topics.write().await;
        let topic = topics.get_mut(id).ok_or_else(|| topic_not_found(id))?;
        topic.touch(at);
        Ok(())
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<(), DomainError> {
        if !self.topics.read().await.contains_key(message.topic_id()) {
            return Err(topic_not_found(message.topic_id()));
        }
        if message.role() == MessageRole::Assistant
            && self.fail_assistant_appends.load(Ordering::SeqCst)
        {
            return Err(DomainError::database(
                "Failed to insert message",
                "simulated outage",
            ));
        }

        self.messages.write().await.push(message.clone());
        Ok(())
    }

    async fn recent_messages(
        &self,
        id: &TopicId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, DomainError> {
        let all = self.messages_for(id).await;
        let skip = all.len().saturating_sub(limit);
        Ok(all.into_iter().skip(skip).collect())
    }
}
