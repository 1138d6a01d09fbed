//! Port traits implemented by the infrastructure crates.
//!
//! The domain sees only these traits. All transport detail — authentication,
//! pagination, encoding, rate limits — lives behind them in the `github` and
//! `storage` crates. Tests substitute in-memory implementations.

use async_trait::async_trait;

use crate::errors::{ApiError, ConfigError, MutationError};
use crate::types::{Label, Product, RepoMapping, RepoPath};

/// Label operations on the hosting platform.
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Lists every label on `repo`, transparently paginating the full set.
    async fn list_labels(&self, repo: &RepoPath) -> Result<Vec<Label>, ApiError>;

    /// Creates `label` on `repo`.
    ///
    /// Fails with [`MutationError::AlreadyExists`] on a name conflict so the
    /// engine can tell a benign concurrent-creation race from a real failure.
    async fn create_label(&self, repo: &RepoPath, label: &Label) -> Result<(), MutationError>;

    /// Rewrites the label currently named `current_name` to match `label`,
    /// including re-asserting the desired name casing.
    async fn update_label(
        &self,
        repo: &RepoPath,
        current_name: &str,
        label: &Label,
    ) -> Result<(), MutationError>;

    /// Deletes the label named `name`.
    async fn delete_label(&self, repo: &RepoPath, name: &str) -> Result<(), MutationError>;
}

/// The centrally managed configuration documents.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetches the full product catalog document.
    async fn product_catalog(&self) -> Result<Vec<Product>, ConfigError>;

    /// Fetches the per-repository mapping document.
    async fn repo_mappings(&self) -> Result<Vec<RepoMapping>, ConfigError>;
}

/// The baseline label document applied to every repository.
#[async_trait]
pub trait BaselineSource: Send + Sync {
    /// Fetches and parses the baseline document.
    async fn fetch_baseline(&self) -> Result<Vec<Label>, ConfigError>;
}
