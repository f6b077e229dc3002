//! Conversation domain module.
//!
//! Chat topics and messages, the pending action that links turns, and the
//! pure pieces of the command interpreter: intent classification, parameter
//! extraction, the confirmation engine and the reply catalogue.

mod engine;
mod extractor;
mod intent;
mod message;
mod pending;
pub mod replies;
mod topic;

pub use engine::{ConfirmationEngine, EngineDecision};
pub use extractor::{
    extract_product_fields, extract_product_name_from_restock, extract_restock_amount,
};
pub use intent::{
    classify, is_add_product, is_affirmation, is_cancellation, is_rejection, is_restock_product,
    numeric_selection, Intent,
};
pub use message::{ChatMessage, MessageRole};
pub use pending::{
    CandidateRef, ConfirmableAction, ConversationPhase, PendingAction, ProductChoice,
    ProductDraft, RestockOrder, TAG_ADD_PRODUCT, TAG_CHOOSE_RESTOCK_PRODUCT, TAG_RESTOCK_PRODUCT,
};
pub use topic::ChatTopic;
