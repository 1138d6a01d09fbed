//! Desired-state computation: baseline labels plus product labels.

use std::sync::Arc;

use crate::baseline::BaselineCache;
use crate::color;
use crate::errors::ConfigError;
use crate::resolver::ProductResolver;
use crate::types::{Label, RepoPath};

/// Builds the full target label list for a repository.
pub struct DesiredStateBuilder {
    baseline: Arc<BaselineCache>,
    resolver: ProductResolver,
}

impl DesiredStateBuilder {
    pub fn new(baseline: Arc<BaselineCache>, resolver: ProductResolver) -> Self {
        Self { baseline, resolver }
    }

    /// Returns the desired label set for `repo`: a copy of the baseline
    /// snapshot followed by one label per resolved product.
    ///
    /// Baseline labels come first, product labels follow in resolver order.
    /// Downstream consumers do not depend on the ordering, but it is kept
    /// stable so converged runs compare equal in tests.
    pub async fn build(&self, repo: &RepoPath) -> Result<Vec<Label>, ConfigError> {
        let baseline = self.baseline.get().await?;
        let products = self.resolver.resolve(repo).await?;

        let mut labels = Vec::with_capacity(baseline.len() + products.len());
        labels.extend(baseline.iter().cloned());
        for product in products {
            labels.push(Label {
                name: product.github_label,
                description: format!("Issues related to the {} API.", product.display_name),
                color: color::assign(&product.api_shortname),
            });
        }
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::ports::{BaselineSource, CatalogStore};
    use crate::types::{Product, RepoMapping};

    use super::*;

    struct StaticBaseline(Vec<Label>);

    #[async_trait]
    impl BaselineSource for StaticBaseline {
        async fn fetch_baseline(&self) -> Result<Vec<Label>, ConfigError> {
            Ok(self.0.clone())
        }
    }

    struct StaticCatalog {
        products: Vec<Product>,
        mappings: Vec<RepoMapping>,
    }

    #[async_trait]
    impl CatalogStore for StaticCatalog {
        async fn product_catalog(&self) -> Result<Vec<Product>, ConfigError> {
            Ok(self.products.clone())
        }

        async fn repo_mappings(&self) -> Result<Vec<RepoMapping>, ConfigError> {
            Ok(self.mappings.clone())
        }
    }

    fn baseline_label() -> Label {
        Label {
            name: "priority: p1".into(),
            description: "Highest priority.".into(),
            color: "b60205".into(),
        }
    }

    fn builder(products: Vec<Product>, mappings: Vec<RepoMapping>) -> DesiredStateBuilder {
        let cache = Arc::new(BaselineCache::new(Arc::new(StaticBaseline(vec![
            baseline_label(),
        ]))));
        let resolver = ProductResolver::new(Arc::new(StaticCatalog { products, mappings }));
        DesiredStateBuilder::new(cache, resolver)
    }

    #[tokio::test]
    async fn baseline_first_then_products_in_resolver_order() {
        let builder = builder(
            vec![
                Product {
                    display_name: "Cloud Translation".into(),
                    github_label: "api: translate".into(),
                    api_shortname: "translate".into(),
                },
                Product {
                    display_name: "Speech".into(),
                    github_label: "api: speech".into(),
                    api_shortname: "speech".into(),
                },
            ],
            vec![],
        );

        let repo = RepoPath::parse("googleapis/monorepo").expect("path");
        let desired = builder.build(&repo).await.expect("build");

        assert_eq!(desired.len(), 3);
        assert_eq!(desired[0], baseline_label());
        assert_eq!(desired[1].name, "api: translate");
        assert_eq!(
            desired[1].description,
            "Issues related to the Cloud Translation API."
        );
        assert_eq!(desired[1].color, "7fd690");
        assert_eq!(desired[2].name, "api: speech");
        assert_eq!(desired[2].color, "05fb61");
    }

    #[tokio::test]
    async fn split_repo_description_uses_the_repo_path() {
        let builder = builder(
            vec![],
            vec![RepoMapping {
                repo: "googleapis/foo".into(),
                github_label: "api: foo".into(),
            }],
        );

        let repo = RepoPath::parse("googleapis/foo").expect("path");
        let desired = builder.build(&repo).await.expect("build");

        assert_eq!(desired.len(), 2);
        assert_eq!(desired[1].name, "api: foo");
        assert_eq!(
            desired[1].description,
            "Issues related to the googleapis/foo API."
        );
        assert_eq!(desired[1].color, "2c26b4");
    }

    #[tokio::test]
    async fn building_twice_does_not_grow_the_cached_baseline() {
        let builder = builder(
            vec![Product {
                display_name: "Speech".into(),
                github_label: "api: speech".into(),
                api_shortname: "speech".into(),
            }],
            vec![],
        );

        let repo = RepoPath::parse("googleapis/monorepo").expect("path");
        let first = builder.build(&repo).await.expect("first build");
        let second = builder.build(&repo).await.expect("second build");

        assert_eq!(first, second);
    }
}
