//! ProductResolver - fuzzy product lookup for chat commands.

use std::sync::Arc;

use crate::domain::catalog::{rank_candidates, Product, ProductCandidate};
use crate::domain::foundation::{DomainError, ProductId};
use crate::ports::ProductRepository;

/// Resolves typed product references against the live catalog.
#[derive(Clone)]
pub struct ProductResolver {
    products: Arc<dyn ProductRepository>,
}

impl ProductResolver {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Ranked candidates for `query`, at most `max` long.
    ///
    /// An empty result is the normal "not found" outcome; errors only come
    /// from the repository.
    pub async fn find_candidates(
        &self,
        query: &str,
        max: usize,
    ) -> Result<Vec<ProductCandidate>, DomainError> {
        let catalog = self.products.list_all().await?;
        let candidates = rank_candidates(query, &catalog, max);

        tracing::debug!(
            query,
            catalog_size = catalog.len(),
            matches = candidates.len(),
            "Ranked product candidates"
        );

        Ok(candidates)
    }

    /// Direct lookup with no fuzzy matching.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, DomainError> {
        self.products.find_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryProductRepository;

    async fn resolver_with(names: &[&str]) -> (ProductResolver, InMemoryProductRepository) {
        let repo = InMemoryProductRepository::new();
        for name in names {
            repo.seed(name, 3500, 10).await;
        }
        (ProductResolver::new(Arc::new(repo.clone())), repo)
    }

    #[tokio::test]
    async fn finds_best_match_first() {
        let (resolver, _) =
            resolver_with(&["Aqua 600ml", "Indomie Goreng", "Indomie Soto"]).await;

        let found = resolver.find_candidates("indomie goreng", 5).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].product.name, "Indomie Goreng");
        assert_eq!(found[0].score, 2);
    }

    #[tokio::test]
    async fn empty_catalog_yields_nothing() {
        let (resolver, _) = resolver_with(&[]).await;
        assert!(resolver.find_candidates("indomie", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn short_tokens_yield_nothing() {
        let (resolver, _) = resolver_with(&["Indomie Goreng"]).await;
        assert!(resolver.find_candidates("in go !!", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn respects_max() {
        let (resolver, _) = resolver_with(&["Teh A", "Teh B", "Teh C"]).await;
        assert_eq!(resolver.find_candidates("teh", 2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn soft_deleted_products_are_skipped() {
        let (resolver, repo) = resolver_with(&["Indomie Goreng"]).await;
        let id = repo.list_all().await.unwrap()[0].id;
        repo.soft_delete(id).await;

        assert!(resolver.find_candidates("indomie", 5).await.unwrap().is_empty());
        assert!(resolver.get_by_id(id).await.unwrap().is_none());
    }
}
