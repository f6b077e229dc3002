//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `GeminiProvider` - Google Gemini `generateContent` endpoint
//! - `MockAIProvider` - Configurable mock for testing

mod gemini_provider;
mod gemini_response;
mod mock_provider;

pub use gemini_provider::{GeminiConfig, GeminiProvider};
pub use mock_provider::{MockAIProvider, MockError, MockResponse};
