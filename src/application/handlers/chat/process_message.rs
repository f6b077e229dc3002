//! ProcessMessageHandler - entry point for one chat message.
//!
//! Order of work for a message:
//! 1. Validate the text, serialize on the topic, check ownership
//! 2. Persist the user message (failures here are returned as errors)
//! 3. Route: pending action via the confirmation engine, otherwise a fresh
//!    command, otherwise the AI fallback
//! 4. Save the new pending action if it changed
//! 5. Persist the assistant reply
//!
//! A confirmed action is different: its pending action is cleared before
//! it runs, so a failed write never leaves it confirmable twice.
//!
//! From step 3 on nothing is returned as an error; failures degrade to a
//! generic reply and the stored user message stays.

use std::sync::Arc;
use thiserror::Error;

use crate::config::AssistantConfig;
use crate::domain::conversation::{
    classify, extract_product_name_from_restock, extract_restock_amount, replies, ChatMessage,
    ChatTopic, ConfirmationEngine, ConversationPhase, EngineDecision, Intent, PendingAction,
};
use crate::domain::foundation::{DomainError, ErrorCode, MessageId, TopicId, UserId};
use crate::ports::{AIProvider, ConversationRepository, ProductRepository};

use super::ai_fallback::{AIFallbackClient, FallbackSettings};
use super::execute_action::ActionExecutor;
use super::resolve_product::ProductResolver;
use crate::application::topic_locks::TopicLocks;

/// Command to process one user message.
#[derive(Debug, Clone)]
pub struct ProcessMessageCommand {
    pub user_id: UserId,
    pub topic_id: TopicId,
    pub content: String,
}

impl ProcessMessageCommand {
    pub fn new(user_id: UserId, topic_id: TopicId, content: impl Into<String>) -> Self {
        Self {
            user_id,
            topic_id,
            content: content.into(),
        }
    }
}

/// Result of processing a message.
#[derive(Debug, Clone)]
pub struct ProcessMessageResult {
    /// Text to show the user.
    pub reply: String,
    /// ID of the stored user message.
    pub user_message_id: MessageId,
    /// ID of the stored reply, `None` if storing it failed.
    pub assistant_message_id: Option<MessageId>,
    /// What the topic is waiting for after this message.
    pub phase: ConversationPhase,
}

/// Errors raised before the user message is stored.
#[derive(Debug, Clone, Error)]
pub enum ProcessMessageError {
    #[error("Validation error: message content cannot be empty")]
    EmptyContent,

    #[error("Validation error: message is {actual} characters, maximum is {max}")]
    TooLong { max: usize, actual: usize },

    #[error("Topic not found: {0}")]
    TopicNotFound(TopicId),

    #[error("Forbidden: user does not own this topic")]
    Forbidden,

    #[error("Repository error: {0}")]
    Persistence(String),
}

impl From<DomainError> for ProcessMessageError {
    fn from(err: DomainError) -> Self {
        ProcessMessageError::Persistence(err.to_string())
    }
}

/// Reply plus the pending action to store, `None` meaning unchanged.
struct Routed {
    reply: String,
    next: Option<PendingAction>,
}

impl Routed {
    fn keep(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            next: None,
        }
    }

    fn from_decision(reply: String, next: PendingAction) -> Self {
        Self {
            reply,
            next: Some(next),
        }
    }
}

/// Handler for chat messages.
pub struct ProcessMessageHandler {
    conversations: Arc<dyn ConversationRepository>,
    resolver: ProductResolver,
    executor: ActionExecutor,
    fallback: AIFallbackClient,
    locks: TopicLocks,
    settings: AssistantConfig,
}

impl ProcessMessageHandler {
    /// Creates a handler with default limits and fallback ladder.
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        products: Arc<dyn ProductRepository>,
        ai_provider: Arc<dyn AIProvider>,
    ) -> Self {
        Self {
            conversations,
            resolver: ProductResolver::new(Arc::clone(&products)),
            executor: ActionExecutor::new(products),
            fallback: AIFallbackClient::new(ai_provider, FallbackSettings::default()),
            locks: TopicLocks::new(),
            settings: AssistantConfig::default(),
        }
    }

    pub fn with_assistant_config(mut self, settings: AssistantConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_fallback_settings(mut self, fallback: FallbackSettings) -> Self {
        self.fallback = AIFallbackClient::new(self.fallback.provider(), fallback);
        self
    }

    /// Shares a lock registry with other handlers serving the same topics.
    pub fn with_topic_locks(mut self, locks: TopicLocks) -> Self {
        self.locks = locks;
        self
    }

    pub async fn handle(
        &self,
        cmd: ProcessMessageCommand,
    ) -> Result<ProcessMessageResult, ProcessMessageError> {
        let content = cmd.content.trim();
        if content.is_empty() {
            return Err(ProcessMessageError::EmptyContent);
        }
        let length = content.chars().count();
        if length > self.settings.max_message_length {
            return Err(ProcessMessageError::TooLong {
                max: self.settings.max_message_length,
                actual: length,
            });
        }

        let _guard = self.locks.acquire(cmd.topic_id).await;

        let mut topic = self
            .conversations
            .find_topic(&cmd.topic_id)
            .await?
            .ok_or(ProcessMessageError::TopicNotFound(cmd.topic_id))?;
        if !topic.is_owned_by(&cmd.user_id) {
            return Err(ProcessMessageError::Forbidden);
        }

        let user_message = ChatMessage::user(cmd.topic_id, content)?;
        self.conversations
            .append_message(&user_message)
            .await
            .map_err(|e| match e.code {
                ErrorCode::TopicNotFound => ProcessMessageError::TopicNotFound(cmd.topic_id),
                _ => ProcessMessageError::Persistence(e.to_string()),
            })?;

        if let Err(err) = self
            .conversations
            .touch_topic(&cmd.topic_id, *user_message.created_at())
            .await
        {
            tracing::warn!(topic_id = %cmd.topic_id, error = %err, "Failed to record topic activity");
        }

        let reply = match self.route(&mut topic, &user_message).await {
            Ok(routed) => match self.store_pending(&mut topic, routed.next).await {
                Ok(()) => routed.reply,
                Err(err) => {
                    tracing::error!(topic_id = %cmd.topic_id, error = %err, "Failed to save pending action");
                    replies::GENERIC_FAILURE.to_string()
                }
            },
            Err(err) => {
                tracing::error!(topic_id = %cmd.topic_id, error = %err, "Failed to process message");
                replies::GENERIC_FAILURE.to_string()
            }
        };

        let assistant_message_id = self.store_reply(&cmd.topic_id, &reply).await;

        Ok(ProcessMessageResult {
            reply,
            user_message_id: *user_message.id(),
            assistant_message_id,
            phase: topic.phase(),
        })
    }

    async fn route(
        &self,
        topic: &mut ChatTopic,
        message: &ChatMessage,
    ) -> Result<Routed, DomainError> {
        let text = message.content();

        if let Some(decision) = ConfirmationEngine::decide(topic.pending(), text) {
            tracing::info!(
                topic_id = %topic.id(),
                phase = ?topic.phase(),
                "Routing reply to pending action"
            );
            return self.apply_decision(topic, decision).await;
        }

        let intent = classify(text);
        tracing::info!(topic_id = %topic.id(), intent = ?intent, "Routing fresh message");

        match intent {
            Intent::Affirmation | Intent::Rejection | Intent::Cancellation => {
                Ok(Routed::keep(replies::NOTHING_TO_CONFIRM))
            }
            Intent::AddProduct => {
                let decision = ConfirmationEngine::propose_add_product(text);
                self.apply_decision(topic, decision).await
            }
            Intent::RestockProduct => self.propose_restock(topic, text).await,
            Intent::NumericSelection(_) | Intent::Unmatched => {
                let history = self.history_before(topic.id(), message.id()).await?;
                let reply = self
                    .fallback
                    .ask(topic.owner(), topic.id(), &history, text)
                    .await;
                Ok(Routed::keep(reply))
            }
        }
    }

    async fn propose_restock(
        &self,
        topic: &mut ChatTopic,
        text: &str,
    ) -> Result<Routed, DomainError> {
        let Some(quantity) = extract_restock_amount(text) else {
            return Ok(Routed::keep(replies::AMOUNT_MISSING));
        };

        let query = extract_product_name_from_restock(text);
        let candidates = self
            .resolver
            .find_candidates(&query, self.settings.max_candidates)
            .await?;
        tracing::debug!(
            topic_id = %topic.id(),
            query = %query,
            quantity,
            candidates = candidates.len(),
            "Resolved restock target"
        );

        let decision = ConfirmationEngine::propose_restock(&query, quantity, &candidates);
        self.apply_decision(topic, decision).await
    }

    async fn apply_decision(
        &self,
        topic: &mut ChatTopic,
        decision: EngineDecision,
    ) -> Result<Routed, DomainError> {
        match decision {
            EngineDecision::Reply { reply, next } => Ok(Routed::from_decision(reply, next)),
            EngineDecision::Execute(action) => {
                if let Err(err) = self.store_pending(topic, Some(PendingAction::Idle)).await {
                    tracing::error!(
                        topic_id = %topic.id(),
                        error = %err,
                        "Failed to clear pending action, not executing"
                    );
                    return Ok(Routed::keep(replies::GENERIC_FAILURE));
                }

                let reply = self
                    .executor
                    .execute(topic.id(), topic.owner(), &action)
                    .await;
                Ok(Routed::keep(reply))
            }
            EngineDecision::Select {
                candidate,
                quantity,
            } => {
                let selected = self.resolver.get_by_id(candidate.id).await?;
                if selected.is_none() {
                    tracing::warn!(
                        topic_id = %topic.id(),
                        product_id = %candidate.id,
                        "Selected product no longer exists"
                    );
                }
                match ConfirmationEngine::confirm_selection(selected.as_ref(), quantity) {
                    EngineDecision::Reply { reply, next } => Ok(Routed::from_decision(reply, next)),
                    _ => Err(DomainError::new(
                        ErrorCode::InternalError,
                        "Selection did not produce a reply",
                    )),
                }
            }
        }
    }

    /// Messages preceding `current`, oldest first, capped at the widest
    /// window the fallback ladder uses.
    async fn history_before(
        &self,
        topic_id: &TopicId,
        current: &MessageId,
    ) -> Result<Vec<ChatMessage>, DomainError> {
        let window = self.fallback.settings().history_window();
        let mut history: Vec<ChatMessage> = self
            .conversations
            .recent_messages(topic_id, window + 1)
            .await?
            .into_iter()
            .filter(|m| m.id() != current)
            .collect();

        let excess = history.len().saturating_sub(window);
        history.drain(..excess);
        Ok(history)
    }

    async fn store_pending(
        &self,
        topic: &mut ChatTopic,
        next: Option<PendingAction>,
    ) -> Result<(), DomainError> {
        let Some(next) = next else {
            return Ok(());
        };
        if &next == topic.pending() {
            return Ok(());
        }

        let mut updated = topic.clone();
        updated.set_pending(next)?;
        self.conversations
            .update_pending(updated.id(), updated.pending())
            .await?;
        *topic = updated;
        Ok(())
    }

    async fn store_reply(&self, topic_id: &TopicId, reply: &str) -> Option<MessageId> {
        let message = match ChatMessage::assistant(*topic_id, reply) {
            Ok(message) => message,
            Err(err) => {
                tracing::error!(topic_id = %topic_id, error = %err, "Refusing to store reply");
                return None;
            }
        };

        match self.conversations.append_message(&message).await {
            Ok(()) => Some(*message.id()),
            Err(err) => {
                tracing::error!(topic_id = %topic_id, error = %err, "Failed to store reply");
                None
            }
        }
    }
}
