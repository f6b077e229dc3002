//! Intent classification for chat input.
//!
//! Each intent is a named predicate over the normalized text so it can be
//! tested on its own. Reply words (yes / no / cancel) must match exactly;
//! command intents are loose keyword combinations in any order.

use once_cell::sync::Lazy;
use regex::Regex;

/// Classified purpose of one user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    AddProduct,
    RestockProduct,
    Affirmation,
    Rejection,
    Cancellation,
    /// A bare number, used to pick a candidate (1-based).
    NumericSelection(usize),
    Unmatched,
}

const AFFIRMATIONS: &[&str] = &["ya", "iya", "yes", "y"];
const REJECTIONS: &[&str] = &["tidak", "no", "n"];
const CANCELLATIONS: &[&str] = &["batal", "cancel", "stop"];

static ADD_VERB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)tambah|add|create").expect("valid add verb pattern"));
static PRODUCT_NOUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)produk|product").expect("valid product noun pattern"));
static RESTOCK_VERB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)restock|restok").expect("valid restock verb pattern"));
static STOCK_NOUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)stock|stok").expect("valid stock noun pattern"));
static STOCK_VERB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)update|increase|tambah").expect("valid stock verb pattern"));

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// "ya", "iya", "yes" or "y".
pub fn is_affirmation(text: &str) -> bool {
    AFFIRMATIONS.contains(&normalize(text).as_str())
}

/// "tidak", "no" or "n".
pub fn is_rejection(text: &str) -> bool {
    REJECTIONS.contains(&normalize(text).as_str())
}

/// "batal", "cancel" or "stop".
pub fn is_cancellation(text: &str) -> bool {
    CANCELLATIONS.contains(&normalize(text).as_str())
}

/// Parses a string made only of ASCII digits.
///
/// Numbers too large for `usize` saturate, which no candidate list can
/// satisfy, so they surface as an invalid selection rather than as text.
pub fn numeric_selection(text: &str) -> Option<usize> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(trimmed.parse().unwrap_or(usize::MAX))
}

/// Add verb together with a product noun, in any order.
pub fn is_add_product(text: &str) -> bool {
    ADD_VERB.is_match(text) && PRODUCT_NOUN.is_match(text)
}

/// Restock verb with a product or stock noun, or an update verb with a stock
/// noun, in any order.
pub fn is_restock_product(text: &str) -> bool {
    (RESTOCK_VERB.is_match(text) && (PRODUCT_NOUN.is_match(text) || STOCK_NOUN.is_match(text)))
        || (STOCK_VERB.is_match(text) && STOCK_NOUN.is_match(text))
}

/// Classifies a message.
///
/// Reply intents are checked before command intents, and adding a product
/// wins over restocking when both match.
pub fn classify(text: &str) -> Intent {
    if is_affirmation(text) {
        Intent::Affirmation
    } else if is_rejection(text) {
        Intent::Rejection
    } else if is_cancellation(text) {
        Intent::Cancellation
    } else if let Some(n) = numeric_selection(text) {
        Intent::NumericSelection(n)
    } else if is_add_product(text) {
        Intent::AddProduct
    } else if is_restock_product(text) {
        Intent::RestockProduct
    } else {
        Intent::Unmatched
    }
}
