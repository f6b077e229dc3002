//! Storage Adapters
//!
//! In-memory implementations of the repository ports.
//!
//! ## Available Adapters
//!
//! - **InMemoryConversationRepository** - Topics and messages (testing/development)
//! - **InMemoryProductRepository** - Product catalog with stock history (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemoryConversationRepository, InMemoryProductRepository};
//!
//! let conversations = InMemoryConversationRepository::new();
//! let products = InMemoryProductRepository::new();
//! products.seed("Indomie Goreng", 3500, 10).await;
//! ```

mod in_memory_conversation_repository;
mod in_memory_product_repository;

pub use in_memory_conversation_repository::InMemoryConversationRepository;
pub use in_memory_product_repository::InMemoryProductRepository;
