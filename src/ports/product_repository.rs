//! Product repository port.
//!
//! The slice of catalog persistence the assistant needs: lookups for
//! resolution, creation of new products and locked stock increases.
//! Soft-deleted products are invisible through every method.

use crate::domain::catalog::{NewProduct, Product, StockAdjustment};
use crate::domain::foundation::{DomainError, ProductId, UserId};
use async_trait::async_trait;

/// Repository port for catalog products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Find a live product by ID.
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, DomainError>;

    /// All live products, for fuzzy ranking.
    async fn list_all(&self) -> Result<Vec<Product>, DomainError>;

    /// Insert a product and return it with its assigned ID.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure (e.g. duplicate SKU)
    async fn create(&self, product: &NewProduct) -> Result<Product, DomainError>;

    /// Atomically add `quantity` to a product's stock and record the change.
    ///
    /// Implementations lock the product row for the read-modify-write and
    /// write a stock history entry in the same transaction. Returns `None`
    /// when the product no longer exists.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if `quantity` is not positive
    /// - `DatabaseError` on persistence failure
    async fn increase_stock(
        &self,
        id: ProductId,
        quantity: i64,
        actor: &UserId,
        note: &str,
    ) -> Result<Option<StockAdjustment>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ProductRepository) {}
    }
}
