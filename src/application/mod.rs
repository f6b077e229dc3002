//! Application layer - Handlers and coordination.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;
mod topic_locks;

pub use handlers::{
    AIFallbackClient, ActionExecutor, FallbackSettings, ProcessMessageCommand,
    ProcessMessageError, ProcessMessageHandler, ProcessMessageResult, ProductResolver,
};
pub use topic_locks::{TopicGuard, TopicLocks};
