//! PostgreSQL implementation of ProductRepository.
//!
//! Stock increases lock the product row with `SELECT ... FOR UPDATE` and
//! write the `stock_histories` entry in the same transaction.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::catalog::{NewProduct, Product, Sku, StockAdjustment};
use crate::domain::foundation::{DomainError, ProductId, Timestamp, UserId, ValidationError};
use crate::ports::ProductRepository;

/// PostgreSQL implementation of ProductRepository.
#[derive(Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    /// Creates a new PostgresProductRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, DomainError> {
    let map = |e: sqlx::Error| DomainError::database("Failed to read product row", e);

    Ok(Product {
        id: ProductId::new(row.try_get("id").map_err(map)?),
        name: row.try_get("name").map_err(map)?,
        sku: Sku::new(row.try_get::<String, _>("sku").map_err(map)?)?,
        price: row.try_get("price").map_err(map)?,
        description: row.try_get("description").map_err(map)?,
        current_stock: row.try_get("current_stock").map_err(map)?,
    })
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, sku, price, description, current_stock
            FROM products
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Product>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, sku, price, description, current_stock
            FROM products
            WHERE deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list products", e))?;

        rows.iter().map(product_from_row).collect()
    }

    async fn create(&self, product: &NewProduct) -> Result<Product, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, sku, price, description, current_stock)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, sku, price, description, current_stock
            "#,
        )
        .bind(&product.name)
        .bind(product.sku.as_str())
        .bind(product.price)
        .bind(&product.description)
        .bind(product.initial_stock)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to insert product", e))?;

        product_from_row(&row)
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

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to start transaction", e))?;

        let locked = sqlx::query(
            r#"
            SELECT id, name, sku, price, description, current_stock
            FROM products
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(id.value())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to lock product", e))?;

        let Some(row) = locked else {
            return Ok(None);
        };
        let before = product_from_row(&row)?;
        let Some(new_stock) = before.current_stock.checked_add(quantity) else {
            return Err(ValidationError::too_large(
                "current_stock",
                i64::MAX - quantity,
                before.current_stock,
            )
            .into());
        };

        sqlx::query(
            r#"
            UPDATE products SET
                current_stock = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .bind(new_stock)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to update stock", e))?;

        let recorded_at: chrono::DateTime<chrono::Utc> = sqlx::query(
            r#"
            INSERT INTO stock_histories (product_id, user_id, type, quantity, notes)
            VALUES ($1, $2, 'increase', $3, $4)
            RETURNING created_at
            "#,
        )
        .bind(id.value())
        .bind(actor.as_str())
        .bind(quantity)
        .bind(note)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to insert stock history", e))?
        .try_get("created_at")
        .map_err(|e| DomainError::database("Failed to read stock history row", e))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))?;

        let previous_stock = before.current_stock;
        let product = Product {
            current_stock: new_stock,
            ..before
        };

        Ok(Some(StockAdjustment {
            product,
            quantity,
            previous_stock,
            actor: actor.clone(),
            note: note.to_string(),
            recorded_at: Timestamp::from_datetime(recorded_at),
        }))
    }
}
