//! label_works config object-store adapter.
//!
//! Implements [`reconcile::CatalogStore`] by fetching the two centrally
//! managed JSON documents — the product catalog and the per-repository
//! mapping — from a public object-storage bucket over plain HTTPS.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Bucket naming, object naming, transport, and schema
//! validation live here. The [`reconcile`] crate sees only
//! [`reconcile::CatalogStore`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use reconcile::{CatalogStore, ConfigError, Product, RepoMapping};

const CATALOG_DOC: &str = "product catalog";
const MAPPING_DOC: &str = "repository mapping";

/// Configuration for [`HttpConfigStore`].
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base URL of the object store. Overridable for tests.
    pub base_url: String,
    /// Bucket holding the configuration documents.
    pub bucket: String,
    /// Object name of the product catalog document.
    pub catalog_object: String,
    /// Object name of the repository mapping document.
    pub mapping_object: String,
}

impl StorageConfig {
    /// The production object-store base URL (Google Cloud Storage's public
    /// HTTP endpoint).
    pub const DEFAULT_BASE_URL: &'static str = "https://storage.googleapis.com";
    /// Default object name of the product catalog document.
    pub const DEFAULT_CATALOG_OBJECT: &'static str = "products.json";
    /// Default object name of the repository mapping document.
    pub const DEFAULT_MAPPING_OBJECT: &'static str = "repos.json";
}

/// Fetches configuration documents from a public bucket.
pub struct HttpConfigStore {
    http: Client,
    config: StorageConfig,
}

impl HttpConfigStore {
    /// Builds a store with a 30 second request timeout.
    pub fn new(config: StorageConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http, config })
    }

    async fn fetch_document<T: DeserializeOwned>(
        &self,
        object: &str,
        document: &'static str,
    ) -> Result<T, ConfigError> {
        let url = format!(
            "{}/{}/{}",
            self.config.base_url, self.config.bucket, object
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ConfigError::Fetch {
                document,
                message: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(ConfigError::Fetch {
                document,
                message: format!("unexpected status {}", response.status()),
            });
        }
        let body = response.text().await.map_err(|e| ConfigError::Fetch {
            document,
            message: e.to_string(),
        })?;
        serde_json::from_str(&body).map_err(|e| ConfigError::Schema {
            document,
            message: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CatalogDoc {
    apis: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct MappingDoc {
    repos: Vec<RepoMapping>,
}

#[async_trait]
impl CatalogStore for HttpConfigStore {
    async fn product_catalog(&self) -> Result<Vec<Product>, ConfigError> {
        let doc: CatalogDoc = self
            .fetch_document(&self.config.catalog_object, CATALOG_DOC)
            .await?;
        tracing::debug!(count = doc.apis.len(), "fetched product catalog");
        Ok(doc.apis)
    }

    async fn repo_mappings(&self) -> Result<Vec<RepoMapping>, ConfigError> {
        let doc: MappingDoc = self
            .fetch_document(&self.config.mapping_object, MAPPING_DOC)
            .await?;
        tracing::debug!(count = doc.repos.len(), "fetched repository mapping");
        Ok(doc.repos)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn store(server: &MockServer) -> HttpConfigStore {
        HttpConfigStore::new(StorageConfig {
            base_url: server.uri(),
            bucket: "devrel-settings".into(),
            catalog_object: StorageConfig::DEFAULT_CATALOG_OBJECT.into(),
            mapping_object: StorageConfig::DEFAULT_MAPPING_OBJECT.into(),
        })
        .expect("store")
    }

    #[tokio::test]
    async fn catalog_parses_the_apis_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/devrel-settings/products.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apis": [{
                    "display_name": "Access Approval",
                    "github_label": "api: accessapproval",
                    "api_shortname": "accessapproval"
                }]
            })))
            .mount(&server)
            .await;

        let products = store(&server).product_catalog().await.expect("catalog");
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].api_shortname, "accessapproval");
    }

    #[tokio::test]
    async fn mapping_tolerates_missing_labels() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/devrel-settings/repos.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "repos": [
                    {"repo": "googleapis/foo", "github_label": "api: foo"},
                    {"repo": "googleapis/monorepo"}
                ]
            })))
            .mount(&server)
            .await;

        let mappings = store(&server).repo_mappings().await.expect("mapping");
        assert_eq!(mappings.len(), 2);
        assert_eq!(mappings[1].github_label, "");
    }

    #[tokio::test]
    async fn missing_object_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/devrel-settings/products.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = store(&server).product_catalog().await.expect_err("missing");
        assert!(matches!(err, ConfigError::Fetch { .. }));
    }

    #[tokio::test]
    async fn malformed_document_is_a_schema_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/devrel-settings/repos.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = store(&server).repo_mappings().await.expect_err("schema");
        assert!(matches!(err, ConfigError::Schema { .. }));
    }
}
