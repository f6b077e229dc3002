//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Generative text providers (Gemini, mock)
//! - `postgres` - PostgreSQL repositories
//! - `storage` - In-memory repositories

pub mod ai;
pub mod postgres;
pub mod storage;

pub use ai::{GeminiConfig, GeminiProvider, MockAIProvider, MockError};
pub use postgres::{PostgresConversationRepository, PostgresProductRepository};
pub use storage::{InMemoryConversationRepository, InMemoryProductRepository};
