//! Keyword-overlap ranking for fuzzy product references.
//!
//! A query such as "indomie goreng" is split into keywords of at least
//! three characters; every product scores one point per keyword found in its
//! lower-cased name. Results are ordered by score, then by name, then by id,
//! so the same catalog and query always produce the same list.

use std::cmp::Ordering;

use super::Product;

/// Keywords shorter than this are ignored.
pub const MIN_KEYWORD_LEN: usize = 3;

/// A product considered as a match for one query, with its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCandidate {
    pub product: Product,
    pub score: u32,
}

/// Splits a query into lower-cased keywords.
///
/// Characters that are not alphanumeric act as separators. Repeated
/// keywords are kept, so they count once per occurrence in the query.
pub fn query_keywords(query: &str) -> Vec<String> {
    let normalized: String = query
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    normalized
        .split_whitespace()
        .filter(|word| word.chars().count() >= MIN_KEYWORD_LEN)
        .map(str::to_string)
        .collect()
}

/// Number of keywords contained in the product name.
pub fn score_name(name: &str, keywords: &[String]) -> u32 {
    let name = name.to_lowercase();
    keywords
        .iter()
        .filter(|keyword| name.contains(keyword.as_str()))
        .count() as u32
}

/// Ranks `products` against `query`, keeping at most `max` entries.
///
/// An empty keyword set or a catalog with no matching names yields an
/// empty list.
pub fn rank_candidates(query: &str, products: &[Product], max: usize) -> Vec<ProductCandidate> {
    let keywords = query_keywords(query);
    if keywords.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<ProductCandidate> = products
        .iter()
        .filter_map(|product| {
            let score = score_name(&product.name, &keywords);
            (score > 0).then(|| ProductCandidate {
                product: product.clone(),
                score,
            })
        })
        .collect();

    candidates.sort_by(compare_candidates);
    candidates.truncate(max);
    candidates
}

fn compare_candidates(a: &ProductCandidate, b: &ProductCandidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.product.name.cmp(&b.product.name))
        .then_with(|| a.product.id.cmp(&b.product.id))
}
