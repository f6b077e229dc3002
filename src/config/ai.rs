//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound accepted for the per-attempt timeout.
const MAX_TIMEOUT_SECS: u64 = 120;

/// Bounds applied to the history window.
const HISTORY_LIMIT_RANGE: std::ops::RangeInclusive<usize> = 1..=50;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key
    pub gemini_api_key: Option<Secret<String>>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL including the version segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Prior messages included in the prompt
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Output token budget of the first attempt
    #[serde(default = "default_first_attempt_tokens")]
    pub first_attempt_max_tokens: u32,

    /// Output token budget of the second attempt
    #[serde(default = "default_second_attempt_tokens")]
    pub second_attempt_max_tokens: u32,

    /// Output token budget of the last attempt
    #[serde(default = "default_final_attempt_tokens")]
    pub final_attempt_max_tokens: u32,

    /// Prior messages included in the last attempt
    #[serde(default = "default_final_attempt_history")]
    pub final_attempt_history: usize,

    /// Sampling temperature of the first two attempts
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// History window clamped to the supported range
    pub fn effective_history_limit(&self) -> usize {
        self.history_limit
            .clamp(*HISTORY_LIMIT_RANGE.start(), *HISTORY_LIMIT_RANGE.end())
    }

    /// Check if a Gemini key is configured
    pub fn has_gemini(&self) -> bool {
        self.gemini_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_gemini() {
            return Err(ValidationError::MissingRequired("AI__GEMINI_API_KEY"));
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AI__MODEL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidAiBaseUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.first_attempt_max_tokens == 0
            || self.second_attempt_max_tokens == 0
            || self.final_attempt_max_tokens == 0
        {
            return Err(ValidationError::InvalidTokenBudget);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            history_limit: default_history_limit(),
            first_attempt_max_tokens: default_first_attempt_tokens(),
            second_attempt_max_tokens: default_second_attempt_tokens(),
            final_attempt_max_tokens: default_final_attempt_tokens(),
            final_attempt_history: default_final_attempt_history(),
            temperature: default_temperature(),
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_history_limit() -> usize {
    15
}

fn default_first_attempt_tokens() -> u32 {
    1024
}

fn default_second_attempt_tokens() -> u32 {
    2048
}

fn default_final_attempt_tokens() -> u32 {
    256
}

fn default_final_attempt_history() -> usize {
    4
}

fn default_temperature() -> f32 {
    0.7
}
