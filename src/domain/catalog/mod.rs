//! Catalog domain module.
//!
//! Products, stock adjustments and the ranking used to resolve fuzzy
//! product references typed into the chat.

mod matcher;
mod product;

pub use matcher::{query_keywords, rank_candidates, score_name, ProductCandidate, MIN_KEYWORD_LEN};
pub use product::{NewProduct, Product, Sku, StockAdjustment, MAX_PRICE, MAX_STOCK_QUANTITY};
