//! Catalog entities touched by the chat assistant.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::foundation::{ProductId, Timestamp, UserId, ValidationError};

/// Largest price accepted from chat, in whole currency units.
pub const MAX_PRICE: i64 = 1_000_000_000;

/// Largest unit count accepted from chat, for initial stock or one restock.
pub const MAX_STOCK_QUANTITY: i64 = 1_000_000;

/// Stock keeping unit code.
///
/// Products created through chat get a generated code of the form
/// `SKU-XXXXXXXX` (eight upper-case alphanumerics).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Prefix shared by every generated code.
    pub const PREFIX: &'static str = "SKU-";

    /// Wraps an existing code, rejecting blank input.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(ValidationError::empty_field("sku"));
        }
        Ok(Self(code))
    }

    /// Generates a fresh random code.
    pub fn generate() -> Self {
        let random: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(8)
            .collect::<String>()
            .to_uppercase();
        Self(format!("{}{}", Self::PREFIX, random))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product as stored in the catalog.
///
/// Prices are whole currency units; stock is a unit count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: Sku,
    pub price: i64,
    pub description: String,
    pub current_stock: i64,
}

/// Data required to insert a new product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub sku: Sku,
    pub price: i64,
    pub description: String,
    pub initial_stock: i64,
}

impl NewProduct {
    /// Builds a product with a generated SKU.
    ///
    /// Fails when the name is blank, or price/stock are negative or above
    /// [`MAX_PRICE`] / [`MAX_STOCK_QUANTITY`].
    pub fn new(
        name: impl Into<String>,
        price: i64,
        initial_stock: i64,
        description: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if price < 0 {
            return Err(ValidationError::too_small("price", 0, price));
        }
        if price > MAX_PRICE {
            return Err(ValidationError::too_large("price", MAX_PRICE, price));
        }
        if initial_stock < 0 {
            return Err(ValidationError::too_small("initial_stock", 0, initial_stock));
        }
        if initial_stock > MAX_STOCK_QUANTITY {
            return Err(ValidationError::too_large(
                "initial_stock",
                MAX_STOCK_QUANTITY,
                initial_stock,
            ));
        }

        Ok(Self {
            name,
            sku: Sku::generate(),
            price,
            description: description.into(),
            initial_stock,
        })
    }
}

/// Result of an applied stock increase, mirrored by a stock history row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product: Product,
    pub quantity: i64,
    pub previous_stock: i64,
    pub actor: UserId,
    pub note: String,
    pub recorded_at: Timestamp,
}

impl StockAdjustment {
    /// Note attached to every restock performed through chat.
    pub const CHAT_RESTOCK_NOTE: &'static str = "Restock via chatbot";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_sku_has_prefix_and_eight_uppercase_chars() {
        let sku = Sku::generate();
        let suffix = sku.as_str().strip_prefix(Sku::PREFIX).unwrap();

        assert_eq!(suffix.len(), 8);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn generated_skus_differ() {
        assert_ne!(Sku::generate(), Sku::generate());
    }

    #[test]
    fn sku_rejects_blank_code() {
        assert!(Sku::new(" ").is_err());
    }

    #[test]
    fn new_product_trims_name() {
        let product = NewProduct::new("  Kopi Kapal Api ", 1500, 10, "").unwrap();
        assert_eq!(product.name, "Kopi Kapal Api");
    }

    #[test]
    fn new_product_rejects_blank_name() {
        assert_eq!(
            NewProduct::new("   ", 1000, 1, "").unwrap_err(),
            ValidationError::empty_field("name")
        );
    }

    #[test]
    fn new_product_rejects_negative_numbers() {
        assert!(NewProduct::new("Gula", -1, 0, "").is_err());
        assert!(NewProduct::new("Gula", 0, -5, "").is_err());
    }

    #[test]
    fn new_product_rejects_numbers_above_limits() {
        assert_eq!(
            NewProduct::new("Gula", MAX_PRICE + 1, 0, "").unwrap_err(),
            ValidationError::too_large("price", MAX_PRICE, MAX_PRICE + 1)
        );
        assert!(NewProduct::new("Gula", 0, i64::MAX, "").is_err());
        assert!(NewProduct::new("Gula", MAX_PRICE, MAX_STOCK_QUANTITY, "").is_ok());
    }
}
