//! Split/mono product resolution.

use std::sync::Arc;

use crate::errors::ConfigError;
use crate::ports::CatalogStore;
use crate::types::{Product, RepoPath};

/// Decides which product labels apply to a repository.
pub struct ProductResolver {
    store: Arc<dyn CatalogStore>,
}

impl ProductResolver {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Resolves the products whose labels `repo` should carry.
    ///
    /// A repository listed in the mapping document with a non-empty
    /// `github_label` is a split repo dedicated to one product: it receives a
    /// single synthetic product built from the mapping entry, with the
    /// repository name as the API shortname. Every other repository is
    /// treated as a mono repo and receives the entire catalog unmodified.
    pub async fn resolve(&self, repo: &RepoPath) -> Result<Vec<Product>, ConfigError> {
        let mappings = self.store.repo_mappings().await?;
        let split = mappings
            .iter()
            .find(|m| m.repo == repo.as_str() && !m.github_label.is_empty());

        if let Some(mapping) = split {
            tracing::debug!(repo = %repo, label = %mapping.github_label, "split repository");
            return Ok(vec![Product {
                display_name: repo.as_str().to_string(),
                github_label: mapping.github_label.clone(),
                api_shortname: repo.name().to_string(),
            }]);
        }

        tracing::debug!(repo = %repo, "mono repository; applying the full catalog");
        self.store.product_catalog().await
    }
}
