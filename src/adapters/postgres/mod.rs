//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresConversationRepository` - Topics, pending actions and messages
//! - `PostgresProductRepository` - Catalog reads and locked stock increases
//!
//! Schema lives in `migrations/` and is applied by [`run_migrations`].

mod conversation_repository;
mod product_repository;

pub use conversation_repository::PostgresConversationRepository;
pub use product_repository::PostgresProductRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::foundation::DomainError;

/// Opens a connection pool sized and timed per configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(Some(config.idle_timeout()))
        .max_lifetime(Some(config.max_lifetime()))
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::database("Failed to connect to database", e))
}

/// Applies pending schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::database("Failed to run migrations", e))
}
