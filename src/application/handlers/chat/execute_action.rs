//! ActionExecutor - runs actions the user has affirmed.
//!
//! Every outcome is a reply string. Stale references and invalid payloads
//! are expected outcomes, not errors, and the caller clears the pending
//! action whatever happens here.

use std::sync::Arc;

use crate::domain::catalog::{NewProduct, StockAdjustment, MAX_STOCK_QUANTITY};
use crate::domain::conversation::{replies, ConfirmableAction, ProductDraft, RestockOrder};
use crate::domain::foundation::{TopicId, UserId};
use crate::ports::ProductRepository;

/// Executes confirmed add-product and restock actions.
#[derive(Clone)]
pub struct ActionExecutor {
    products: Arc<dyn ProductRepository>,
}

impl ActionExecutor {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Runs `action` on behalf of `actor` and returns the reply.
    pub async fn execute(
        &self,
        topic_id: &TopicId,
        actor: &UserId,
        action: &ConfirmableAction,
    ) -> String {
        match action {
            ConfirmableAction::AddProduct(draft) => self.add_product(topic_id, draft).await,
            ConfirmableAction::Restock(order) => self.restock(topic_id, actor, order).await,
        }
    }

    async fn add_product(&self, topic_id: &TopicId, draft: &ProductDraft) -> String {
        let Some(name) = draft.name.as_deref().filter(|n| !n.trim().is_empty()) else {
            tracing::warn!(topic_id = %topic_id, "Add product confirmed without a name");
            return replies::ADD_NAME_MISSING.to_string();
        };

        let new_product =
            match NewProduct::new(name, draft.price, draft.initial_stock, &draft.description) {
                Ok(product) => product,
                Err(err) => {
                    tracing::warn!(topic_id = %topic_id, error = %err, "Rejected product draft");
                    return replies::ADD_FAILED.to_string();
                }
            };

        match self.products.create(&new_product).await {
            Ok(product) => {
                tracing::info!(
                    topic_id = %topic_id,
                    product_id = %product.id,
                    sku = %product.sku,
                    "Product created via chat"
                );
                replies::PRODUCT_ADDED.to_string()
            }
            Err(err) => {
                tracing::error!(topic_id = %topic_id, error = %err, "Failed to create product");
                replies::ADD_FAILED.to_string()
            }
        }
    }

    async fn restock(&self, topic_id: &TopicId, actor: &UserId, order: &RestockOrder) -> String {
        if order.quantity <= 0 || order.quantity > MAX_STOCK_QUANTITY {
            tracing::warn!(
                topic_id = %topic_id,
                quantity = order.quantity,
                "Restock confirmed with an out-of-range quantity"
            );
            return replies::RESTOCK_INVALID.to_string();
        }

        let result = self
            .products
            .increase_stock(
                order.product_id,
                order.quantity,
                actor,
                StockAdjustment::CHAT_RESTOCK_NOTE,
            )
            .await;

        match result {
            Ok(Some(adjustment)) => {
                tracing::info!(
                    topic_id = %topic_id,
                    product_id = %adjustment.product.id,
                    previous_stock = adjustment.previous_stock,
                    new_stock = adjustment.product.current_stock,
                    "Stock increased via chat"
                );
                replies::restock_succeeded(&adjustment.product.name, adjustment.quantity)
            }
            Ok(None) => {
                tracing::warn!(
                    topic_id = %topic_id,
                    product_id = %order.product_id,
                    "Restock target no longer exists"
                );
                replies::RESTOCK_PRODUCT_GONE.to_string()
            }
            Err(err) => {
                tracing::error!(topic_id = %topic_id, error = %err, "Failed to increase stock");
                replies::RESTOCK_FAILED.to_string()
            }
        }
    }
}
