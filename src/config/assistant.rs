//! Chat assistant behaviour configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Chat assistant configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// Maximum candidates offered when a product reference is ambiguous
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Maximum accepted message length in characters
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

impl AssistantConfig {
    /// Validate assistant configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_candidates == 0 {
            return Err(ValidationError::InvalidCandidateLimit);
        }
        if self.max_message_length == 0 {
            return Err(ValidationError::InvalidMessageLength);
        }
        Ok(())
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            max_candidates: default_max_candidates(),
            max_message_length: default_max_message_length(),
        }
    }
}

fn default_max_candidates() -> usize {
    5
}

fn default_max_message_length() -> usize {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_config_defaults() {
        let config = AssistantConfig::default();
        assert_eq!(config.max_candidates, 5);
        assert_eq!(config.max_message_length, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_candidates() {
        let config = AssistantConfig {
            max_candidates: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
