//! Chat topic entity.
//!
//! A topic is one ongoing conversation owned by a single user. It carries
//! the pending action that links consecutive turns.

use crate::domain::foundation::{StateMachine, Timestamp, TopicId, UserId, ValidationError};

use super::pending::{ConversationPhase, PendingAction};

/// One ongoing chat session.
///
/// # Invariants
///
/// - At most one pending action at a time; setting a new one replaces the old
/// - Pending changes follow the `ConversationPhase` transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTopic {
    id: TopicId,
    owner: UserId,
    pending: PendingAction,
    last_message_at: Option<Timestamp>,
    created_at: Timestamp,
}

impl ChatTopic {
    /// Starts a new idle topic for `owner`.
    pub fn new(owner: UserId) -> Self {
        Self {
            id: TopicId::new(),
            owner,
            pending: PendingAction::Idle,
            last_message_at: None,
            created_at: Timestamp::now(),
        }
    }

    /// Reconstitutes a topic from persistence (no validation).
    pub fn reconstitute(
        id: TopicId,
        owner: UserId,
        pending: PendingAction,
        last_message_at: Option<Timestamp>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            owner,
            pending,
            last_message_at,
            created_at,
        }
    }

    pub fn id(&self) -> &TopicId {
        &self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn pending(&self) -> &PendingAction {
        &self.pending
    }

    pub fn phase(&self) -> ConversationPhase {
        self.pending.phase()
    }

    pub fn last_message_at(&self) -> Option<&Timestamp> {
        self.last_message_at.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns true if `user` owns this topic.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    /// Replaces the pending action.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the phase change is not allowed.
    pub fn set_pending(&mut self, next: PendingAction) -> Result<(), ValidationError> {
        self.phase().transition_to(next.phase())?;
        self.pending = next;
        Ok(())
    }

    /// Records activity on the topic.
    pub fn touch(&mut self, at: Timestamp) {
        self.last_message_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::pending::{
        CandidateRef, ConfirmableAction, ProductChoice, RestockOrder,
    };
    use crate::domain::foundation::ProductId;

    fn owner() -> UserId {
        UserId::new("admin").unwrap()
    }

    fn restock() -> PendingAction {
        PendingAction::AwaitingConfirm(ConfirmableAction::Restock(RestockOrder {
            product_id: ProductId::new(1),
            quantity: 5,
        }))
    }

    fn choice() -> PendingAction {
        PendingAction::AwaitingChoice(ProductChoice {
            quantity: 5,
            candidates: vec![CandidateRef { id: ProductId::new(1), name: "Kopi".into() }],
        })
    }

    #[test]
    fn new_topic_is_idle_and_unvisited() {
        let topic = ChatTopic::new(owner());
        assert_eq!(topic.phase(), ConversationPhase::Idle);
        assert!(topic.last_message_at().is_none());
    }

    #[test]
    fn ownership_is_checked_by_user_id() {
        let topic = ChatTopic::new(owner());
        assert!(topic.is_owned_by(&owner()));
        assert!(!topic.is_owned_by(&UserId::new("someone-else").unwrap()));
    }

    #[test]
    fn choice_can_be_promoted_to_confirmation() {
        let mut topic = ChatTopic::new(owner());
        topic.set_pending(choice()).unwrap();
        topic.set_pending(restock()).unwrap();
        assert_eq!(topic.phase(), ConversationPhase::AwaitingConfirmation);
    }

    #[test]
    fn confirmation_cannot_go_back_to_choice() {
        let mut topic = ChatTopic::new(owner());
        topic.set_pending(restock()).unwrap();

        assert!(topic.set_pending(choice()).is_err());
        assert_eq!(topic.pending(), &restock());
    }

    #[test]
    fn clear_returns_to_idle() {
        let mut topic = ChatTopic::new(owner());
        topic.set_pending(restock()).unwrap();
        topic.set_pending(PendingAction::Idle).unwrap();
        assert!(topic.pending().is_idle());
    }

    #[test]
    fn touch_records_activity() {
        let mut topic = ChatTopic::new(owner());
        let now = Timestamp::now();
        topic.touch(now);
        assert_eq!(topic.last_message_at(), Some(&now));
    }
}
