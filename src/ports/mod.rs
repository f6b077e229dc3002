//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ConversationRepository` - Chat topics, pending state and messages
//! - `ProductRepository` - Catalog lookups, creation and stock increases
//! - `AIProvider` - Generative text completion

mod ai_provider;
mod conversation_repository;
mod product_repository;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    RequestMetadata, TokenUsage,
};
pub use conversation_repository::ConversationRepository;
pub use product_repository::ProductRepository;
