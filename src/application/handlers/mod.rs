//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod chat;

pub use chat::{
    AIFallbackClient, ActionExecutor, FallbackSettings, ProcessMessageCommand,
    ProcessMessageError, ProcessMessageHandler, ProcessMessageResult, ProductResolver,
};
