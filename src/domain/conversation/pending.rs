//! Pending action carried by a topic between turns.
//!
//! A topic holds at most one pending action. In storage it is a string tag
//! plus a JSON payload; in memory it is an explicit sum type so the payload
//! shape always matches the tag.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{DomainError, ErrorCode, ProductId, StateMachine};

/// Storage tag for a pending product creation.
pub const TAG_ADD_PRODUCT: &str = "add_product";
/// Storage tag for a pending stock increase.
pub const TAG_RESTOCK_PRODUCT: &str = "restock_product";
/// Storage tag for a pending product disambiguation.
pub const TAG_CHOOSE_RESTOCK_PRODUCT: &str = "choose_restock_product";

/// Product fields extracted from an "add product" message.
///
/// The name may be missing; it is checked when the action executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: i64,
    #[serde(default, rename = "current_stock")]
    pub initial_stock: i64,
    #[serde(default)]
    pub description: String,
}

/// A stock increase for one resolved product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockOrder {
    pub product_id: ProductId,
    #[serde(rename = "qty")]
    pub quantity: i64,
}

/// Minimal projection of a candidate kept between turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRef {
    pub id: ProductId,
    pub name: String,
}

/// Candidates offered to the user, waiting for a numeric pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductChoice {
    #[serde(rename = "amount")]
    pub quantity: i64,
    pub candidates: Vec<CandidateRef>,
}

impl ProductChoice {
    /// Returns the candidate for a 1-based selection, if in range.
    pub fn select(&self, number: usize) -> Option<&CandidateRef> {
        number.checked_sub(1).and_then(|i| self.candidates.get(i))
    }
}

/// An action that runs once the user affirms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmableAction {
    AddProduct(ProductDraft),
    Restock(RestockOrder),
}

/// What a topic is waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PendingAction {
    #[default]
    Idle,
    AwaitingChoice(ProductChoice),
    AwaitingConfirm(ConfirmableAction),
}

impl PendingAction {
    /// Phase of the state machine this action belongs to.
    pub fn phase(&self) -> ConversationPhase {
        match self {
            Self::Idle => ConversationPhase::Idle,
            Self::AwaitingChoice(_) => ConversationPhase::AwaitingProductChoice,
            Self::AwaitingConfirm(_) => ConversationPhase::AwaitingConfirmation,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Storage tag, `None` when idle.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Self::Idle => None,
            Self::AwaitingChoice(_) => Some(TAG_CHOOSE_RESTOCK_PRODUCT),
            Self::AwaitingConfirm(ConfirmableAction::AddProduct(_)) => Some(TAG_ADD_PRODUCT),
            Self::AwaitingConfirm(ConfirmableAction::Restock(_)) => Some(TAG_RESTOCK_PRODUCT),
        }
    }

    /// Encodes the action as `(tag, payload)` columns.
    pub fn to_storage(&self) -> Result<(Option<&'static str>, Option<Value>), DomainError> {
        let payload = match self {
            Self::Idle => None,
            Self::AwaitingChoice(choice) => Some(serde_json::to_value(choice)),
            Self::AwaitingConfirm(ConfirmableAction::AddProduct(draft)) => {
                Some(serde_json::to_value(draft))
            }
            Self::AwaitingConfirm(ConfirmableAction::Restock(order)) => {
                Some(serde_json::to_value(order))
            }
        };

        let payload = payload
            .transpose()
            .map_err(|e| DomainError::new(ErrorCode::InternalError, e.to_string()))?;

        Ok((self.tag(), payload))
    }

    /// Decodes `(tag, payload)` columns.
    ///
    /// # Errors
    ///
    /// - `CorruptPendingState` for an unknown tag or a payload that does not
    ///   match the tag's shape
    pub fn from_storage(tag: Option<&str>, payload: Option<Value>) -> Result<Self, DomainError> {
        let Some(tag) = tag else {
            return Ok(Self::Idle);
        };

        let payload = payload.unwrap_or(Value::Null);
        let corrupt = |e: serde_json::Error| {
            DomainError::new(
                ErrorCode::CorruptPendingState,
                format!("Malformed payload for pending action '{}': {}", tag, e),
            )
            .with_detail("tag", tag)
        };

        match tag {
            TAG_ADD_PRODUCT => serde_json::from_value(payload)
                .map(|draft| Self::AwaitingConfirm(ConfirmableAction::AddProduct(draft)))
                .map_err(corrupt),
            TAG_RESTOCK_PRODUCT => serde_json::from_value(payload)
                .map(|order| Self::AwaitingConfirm(ConfirmableAction::Restock(order)))
                .map_err(corrupt),
            TAG_CHOOSE_RESTOCK_PRODUCT => serde_json::from_value(payload)
                .map(Self::AwaitingChoice)
                .map_err(corrupt),
            other => Err(DomainError::new(
                ErrorCode::CorruptPendingState,
                format!("Unknown pending action '{}'", other),
            )
            .with_detail("tag", other)),
        }
    }
}

/// Phases of the confirmation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationPhase {
    Idle,
    AwaitingProductChoice,
    AwaitingConfirmation,
}

impl StateMachine for ConversationPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationPhase::*;
        !matches!((self, target), (AwaitingConfirmation, AwaitingProductChoice))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationPhase::*;
        match self {
            Idle => vec![Idle, AwaitingProductChoice, AwaitingConfirmation],
            AwaitingProductChoice => vec![AwaitingProductChoice, AwaitingConfirmation, Idle],
            AwaitingConfirmation => vec![AwaitingConfirmation, Idle],
        }
    }
}
