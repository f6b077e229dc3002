//! In-Memory Product Repository
//!
//! Catalog held in memory with sequential IDs, soft deletion and a stock
//! history log. Useful for testing and development.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::catalog::{NewProduct, Product, Sku, StockAdjustment};
use crate::domain::foundation::{DomainError, ProductId, Timestamp, UserId, ValidationError};
use crate::ports::ProductRepository;

#[derive(Debug, Clone)]
struct StoredProduct {
    product: Product,
    deleted: bool,
}

#[derive(Debug, Default)]
struct Catalog {
    products: BTreeMap<ProductId, StoredProduct>,
    next_id: i64,
    history: Vec<StockAdjustment>,
}

/// In-memory product catalog
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductRepository {
    catalog: Arc<RwLock<Catalog>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryProductRepository {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product directly, bypassing the write failure switch.
    pub async fn seed(&self, name: &str, price: i64, stock: i64) -> Product {
        let mut catalog = self.catalog.write().await;
        catalog.next_id += 1;
        let product = Product {
            id: ProductId::new(catalog.next_id),
            name: name.to_string(),
            sku: Sku::generate(),
            price,
            description: String::new(),
            current_stock: stock,
        };
        catalog.products.insert(
            product.id,
            StoredProduct {
                product: product.clone(),
                deleted: false,
            },
        );
        product
    }

    /// Mark a product deleted; it disappears from every port method.
    pub async fn soft_delete(&self, id: ProductId) {
        if let Some(stored) = self.catalog.write().await.products.get_mut(&id) {
            stored.deleted = true;
        }
    }

    /// Make `create` and `increase_stock` fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every stock increase recorded so far.
    pub async fn stock_history(&self) -> Vec<StockAdjustment> {
        self.catalog.read().await.history.clone()
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("Write rejected", "simulated outage"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self
            .catalog
            .read()
            .await
            .products
            .get(&id)
            .filter(|s| !s.deleted)
            .map(|s| s.product.clone()))
    }

    async fn list_all(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .catalog
            .read()
            .await
            .products
            .values()
            .filter(|s| !s.deleted)
            .map(|s| s.product.clone())
            .collect())
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, DomainError> {
        self.check_writable()?;

        let mut catalog = self.catalog.write().await;
        if catalog
            .products
            .values()
            .any(|s| s.product.sku == product.sku)
        {
            return Err(DomainError::database(
                "Failed to insert product",
                format!("duplicate sku {}", product.sku),
            ));
        }

        catalog.next_id += 1;
        let created = Product {
            id: ProductId::new(catalog.next_id),
            name: product.name.clone(),
            sku: product.sku.clone(),
            price: product.price,
            description: product.description.clone(),
            current_stock: product.initial_stock,
        };
        catalog.products.insert(
            created.id,
            StoredProduct {
                product: created.clone(),
                deleted: false,
            },
        );
        Ok(created)
    }

    async fn increase_stock(
        &self,
        id: ProductId,
        quantity: i64,
        actor: &UserId,
        note: &str,
    ) -> Result<Option<StockAdjustment>, DomainError> {
        if quantity <= 0 {
            return Err(ValidationError::too_small("quantity", 1, quantity).into());
        }
        self.check_writable()?;

        // The write lock plays the part of the row lock.
        let mut catalog = self.catalog.write().await;
        let Some(stored) = catalog.products.get_mut(&id).filter(|s| !s.deleted) else {
            return Ok(None);
        };

        let previous_stock = stored.product.current_stock;
        let Some(new_stock) = previous_stock.checked_add(quantity) else {
            return Err(ValidationError::too_large(
                "current_stock",
                i64::MAX - quantity,
                previous_stock,
            )
            .into());
        };
        stored.product.current_stock = new_stock;

        let adjustment = StockAdjustment {
            product: stored.product.clone(),
            quantity,
            previous_stock,
            actor: actor.clone(),
            note: note.to_string(),
            recorded_at: Timestamp::now(),
        };
        catalog.history.push(adjustment.clone());
        Ok(Some(adjustment))
    }
}
