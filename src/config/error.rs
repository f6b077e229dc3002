//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid AI request timeout (must be 1-120 seconds)")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid AI base URL (must be http or https)")]
    InvalidAiBaseUrl,

    #[error("AI token budgets must be positive")]
    InvalidTokenBudget,

    #[error("AI temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("Candidate limit must be positive")]
    InvalidCandidateLimit,

    #[error("Maximum message length must be positive")]
    InvalidMessageLength,
}
