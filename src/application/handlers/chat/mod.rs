//! Chat handlers: the message orchestrator and the services it sequences.

mod ai_fallback;
mod execute_action;
mod process_message;
mod resolve_product;

pub use ai_fallback::{render_prompt, AIFallbackClient, AttemptPlan, FallbackSettings};
pub use execute_action::ActionExecutor;
pub use process_message::{
    ProcessMessageCommand, ProcessMessageError, ProcessMessageHandler, ProcessMessageResult,
};
pub use resolve_product::ProductResolver;
