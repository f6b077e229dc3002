//! PostgreSQL implementation of ConversationRepository.
//!
//! Topics live in `chat_topics` with the pending action split into a text
//! tag and a JSONB payload; messages live in `chat_messages`, ordered by an
//! insertion sequence.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::conversation::{ChatMessage, ChatTopic, MessageRole, PendingAction};
use crate::domain::foundation::{
    DomainError, ErrorCode, MessageId, Timestamp, TopicId, UserId,
};
use crate::ports::ConversationRepository;

/// SQLSTATE for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL implementation of ConversationRepository.
#[derive(Clone)]
pub struct PostgresConversationRepository {
    pool: PgPool,
}

impl PostgresConversationRepository {
    /// Creates a new PostgresConversationRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn topic_not_found(id: &TopicId) -> DomainError {
    DomainError::new(ErrorCode::TopicNotFound, "Topic not found").with_detail("topic_id", id.to_string())
}

/// Decodes stored pending columns, falling back to idle when they are
/// unreadable so a bad row cannot wedge the topic.
pub(crate) fn decode_pending(
    topic_id: &TopicId,
    tag: Option<&str>,
    payload: Option<Value>,
) -> PendingAction {
    match PendingAction::from_storage(tag, payload) {
        Ok(pending) => pending,
        Err(err) => {
            tracing::warn!(
                topic_id = %topic_id,
                error = %err,
                "Discarding undecodable pending action"
            );
            PendingAction::Idle
        }
    }
}

fn topic_from_row(row: &PgRow) -> Result<ChatTopic, DomainError> {
    let map = |e: sqlx::Error| DomainError::database("Failed to read topic row", e);

    let id = TopicId::from_uuid(row.try_get::<Uuid, _>("id").map_err(map)?);
    let owner = UserId::new(row.try_get::<String, _>("user_id").map_err(map)?)?;
    let tag: Option<String> = row.try_get("pending_action").map_err(map)?;
    let payload: Option<Value> = row.try_get("pending_payload").map_err(map)?;
    let last_message_at: Option<chrono::DateTime<chrono::Utc>> =
        row.try_get("last_message_at").map_err(map)?;
    let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(map)?;

    let pending = decode_pending(&id, tag.as_deref(), payload);

    Ok(ChatTopic::reconstitute(
        id,
        owner,
        pending,
        last_message_at.map(Timestamp::from_datetime),
        Timestamp::from_datetime(created_at),
    ))
}

fn message_from_row(row: &PgRow) -> Result<ChatMessage, DomainError> {
    let map = |e: sqlx::Error| DomainError::database("Failed to read message row", e);

    let id: Uuid = row.try_get("id").map_err(map)?;
    let topic_id: Uuid = row.try_get("topic_id").map_err(map)?;
    let role: String = row.try_get("role").map_err(map)?;
    let content: String = row.try_get("content").map_err(map)?;
    let created_at: chrono::DateTime<chrono::Utc> = row.try_get("created_at").map_err(map)?;

    Ok(ChatMessage::reconstitute(
        MessageId::from_uuid(id),
        TopicId::from_uuid(topic_id),
        role.parse::<MessageRole>()?,
        content,
        Timestamp::from_datetime(created_at),
    ))
}

#[async_trait]
impl ConversationRepository for PostgresConversationRepository {
    async fn create_topic(&self, topic: &ChatTopic) -> Result<(), DomainError> {
        let (tag, payload) = topic.pending().to_storage()?;

        sqlx::query(
            r#"
            INSERT INTO chat_topics (
                id, user_id, pending_action, pending_payload, last_message_at, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(topic.id().as_uuid())
        .bind(topic.owner().as_str())
        .bind(tag)
        .bind(payload)
        .bind(topic.last_message_at().map(|t| *t.as_datetime()))
        .bind(topic.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to insert topic", e))?;

        Ok(())
    }

    async fn find_topic(&self, id: &TopicId) -> Result<Option<ChatTopic>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, pending_action, pending_payload, last_message_at, created_at
            FROM chat_topics
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch topic", e))?;

        row.as_ref().map(topic_from_row).transpose()
    }

    async fn update_pending(
        &self,
        id: &TopicId,
        pending: &PendingAction,
    ) -> Result<(), DomainError> {
        let (tag, payload) = pending.to_storage()?;

        let result = sqlx::query(
            r#"
            UPDATE chat_topics SET
                pending_action = $2,
                pending_payload = $3
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(tag)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to update pending action", e))?;

        if result.rows_affected() == 0 {
            return Err(topic_not_found(id));
        }

        Ok(())
    }

    async fn touch_topic(&self, id: &TopicId, at: Timestamp) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE chat_topics SET last_message_at = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(at.as_datetime())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to update topic activity", e))?;

        if result.rows_affected() == 0 {
            return Err(topic_not_found(id));
        }

        Ok(())
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, topic_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(message.topic_id().as_uuid())
        .bind(message.role().as_str())
        .bind(message.content())
        .bind(message.created_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let is_fk_violation = e
                .as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);
            if is_fk_violation {
                topic_not_found(message.topic_id())
            } else {
                DomainError::database("Failed to insert message", e)
            }
        })?;

        Ok(())
    }

    async fn recent_messages(
        &self,
        id: &TopicId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, topic_id, role, content, created_at
            FROM (
                SELECT id, topic_id, role, content, created_at, seq
                FROM chat_messages
                WHERE topic_id = $1
                ORDER BY seq DESC
                LIMIT $2
            ) latest
            ORDER BY seq ASC
            "#,
        )
        .bind(id.as_uuid())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch messages", e))?;

        rows.iter().map(message_from_row).collect()
    }
}
