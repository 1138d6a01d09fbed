//! label_works GitHub infrastructure adapter.
//!
//! Implements the hosting-platform traits defined in the [`reconcile`] crate
//! ([`LabelStore`], [`BaselineSource`]) against the GitHub REST API.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. All GitHub
//! API details (authentication, pagination, label-name encoding, conflict
//! detection, contents-endpoint base64 decoding) are handled here; the
//! [`reconcile`] crate never sees them.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use reconcile::{ApiError, BaselineSource, ConfigError, Label, LabelStore, MutationError, RepoPath};

const PER_PAGE: usize = 100;
const USER_AGENT: &str = concat!("label-works/", env!("CARGO_PKG_VERSION"));
const BASELINE_DOC: &str = "baseline label document";

/// Where the baseline label document lives: a file path inside a repository,
/// read through the contents endpoint so the deployed bot always sees the
/// current default-branch version rather than a stale local copy.
#[derive(Debug, Clone, Deserialize)]
pub struct BaselineLocation {
    /// Owner of the repository holding the document.
    pub owner: String,
    /// Repository holding the document.
    pub repo: String,
    /// Path of the document within the repository.
    pub path: String,
}

/// Configuration for [`GithubClient`].
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// API token used as a bearer credential.
    pub token: String,
    /// Base URL of the REST API. Overridable for tests.
    pub api_base: String,
    /// Location of the baseline label document.
    pub baseline: BaselineLocation,
}

impl GithubConfig {
    /// The production API base URL.
    pub const DEFAULT_API_BASE: &'static str = "https://api.github.com";
}

/// GitHub REST client implementing the hosting-platform ports.
pub struct GithubClient {
    http: Client,
    config: GithubConfig,
}

impl GithubClient {
    /// Builds a client with a 30 second request timeout.
    pub fn new(config: GithubConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, config })
    }

    fn labels_url(&self, repo: &RepoPath) -> String {
        format!("{}/repos/{}/labels", self.config.api_base, repo.as_str())
    }

    fn label_url(&self, repo: &RepoPath, name: &str) -> String {
        format!(
            "{}/repos/{}/labels/{}",
            self.config.api_base,
            repo.as_str(),
            urlencoding::encode(name)
        )
    }

    /// Converts a non-success response into an [`ApiError`], consuming the
    /// body for the error message.
    async fn into_api_error(response: Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ApiError::status(status.as_u16(), body.trim().to_string())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A label as GitHub returns it. `description` may be `null`.
#[derive(Debug, Deserialize)]
struct LabelRep {
    name: String,
    #[serde(default)]
    description: Option<String>,
    color: String,
}

impl From<LabelRep> for Label {
    fn from(rep: LabelRep) -> Self {
        Label {
            name: rep.name,
            description: rep.description.unwrap_or_default(),
            color: rep.color,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateLabelBody<'a> {
    name: &'a str,
    description: &'a str,
    color: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateLabelBody<'a> {
    new_name: &'a str,
    description: &'a str,
    color: &'a str,
}

/// Subset of GitHub's 422 validation body needed to spot name conflicts.
#[derive(Debug, Default, Deserialize)]
struct ValidationBody {
    #[serde(default)]
    errors: Vec<ValidationEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ValidationEntry {
    #[serde(default)]
    code: String,
}

#[derive(Debug, Deserialize)]
struct ContentsRep {
    content: String,
}

#[derive(Debug, Deserialize)]
struct BaselineDoc {
    labels: Vec<Label>,
}

// ---------------------------------------------------------------------------
// LabelStore
// ---------------------------------------------------------------------------

#[async_trait]
impl LabelStore for GithubClient {
    async fn list_labels(&self, repo: &RepoPath) -> Result<Vec<Label>, ApiError> {
        let mut labels = Vec::new();
        let mut page = 1u32;
        loop {
            let response = self
                .http
                .get(self.labels_url(repo))
                .bearer_auth(&self.config.token)
                .query(&[("per_page", PER_PAGE.to_string()), ("page", page.to_string())])
                .send()
                .await
                .map_err(|e| ApiError::transport(e.to_string()))?;
            if !response.status().is_success() {
                return Err(Self::into_api_error(response).await);
            }
            let batch: Vec<LabelRep> = response
                .json()
                .await
                .map_err(|e| ApiError::transport(e.to_string()))?;
            let short_page = batch.len() < PER_PAGE;
            labels.extend(batch.into_iter().map(Label::from));
            if short_page {
                break;
            }
            page += 1;
        }
        tracing::debug!(repo = %repo, count = labels.len(), "listed labels");
        Ok(labels)
    }

    async fn create_label(&self, repo: &RepoPath, label: &Label) -> Result<(), MutationError> {
        let response = self
            .http
            .post(self.labels_url(repo))
            .bearer_auth(&self.config.token)
            .json(&CreateLabelBody {
                name: &label.name,
                description: &label.description,
                color: &label.color,
            })
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let validation: ValidationBody = serde_json::from_str(&body).unwrap_or_default();
            if validation.errors.iter().any(|e| e.code == "already_exists") {
                return Err(MutationError::AlreadyExists {
                    name: label.name.clone(),
                });
            }
        }
        Err(ApiError::status(status.as_u16(), body.trim().to_string()).into())
    }

    async fn update_label(
        &self,
        repo: &RepoPath,
        current_name: &str,
        label: &Label,
    ) -> Result<(), MutationError> {
        let response = self
            .http
            .patch(self.label_url(repo, current_name))
            .bearer_auth(&self.config.token)
            .json(&UpdateLabelBody {
                new_name: &label.name,
                description: &label.description,
                color: &label.color,
            })
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::into_api_error(response).await.into())
    }

    async fn delete_label(&self, repo: &RepoPath, name: &str) -> Result<(), MutationError> {
        let response = self
            .http
            .delete(self.label_url(repo, name))
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::into_api_error(response).await.into())
    }
}

// ---------------------------------------------------------------------------
// BaselineSource
// ---------------------------------------------------------------------------

#[async_trait]
impl BaselineSource for GithubClient {
    async fn fetch_baseline(&self) -> Result<Vec<Label>, ConfigError> {
        let location = &self.config.baseline;
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_base, location.owner, location.repo, location.path
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(|e| ConfigError::Fetch {
                document: BASELINE_DOC,
                message: e.to_string(),
            })?;
        if !response.status().is_success() {
            return Err(ConfigError::Fetch {
                document: BASELINE_DOC,
                message: format!("unexpected status {}", response.status()),
            });
        }
        let contents: ContentsRep = response.json().await.map_err(|e| ConfigError::Schema {
            document: BASELINE_DOC,
            message: e.to_string(),
        })?;

        // The contents endpoint chunks base64 with embedded newlines.
        let packed: String = contents.content.split_whitespace().collect();
        let raw = BASE64.decode(packed).map_err(|e| ConfigError::Decode {
            document: BASELINE_DOC,
            message: e.to_string(),
        })?;
        let doc: BaselineDoc =
            serde_json::from_slice(&raw).map_err(|e| ConfigError::Schema {
                document: BASELINE_DOC,
                message: e.to_string(),
            })?;
        tracing::debug!(count = doc.labels.len(), "fetched baseline label document");
        Ok(doc.labels)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> GithubClient {
        GithubClient::new(GithubConfig {
            token: "test-token".into(),
            api_base: server.uri(),
            baseline: BaselineLocation {
                owner: "acme".into(),
                repo: "settings".into(),
                path: "labels.json".into(),
            },
        })
        .expect("client")
    }

    fn repo() -> RepoPath {
        RepoPath::parse("acme/widgets").expect("path")
    }

    fn label_json(name: &str) -> serde_json::Value {
        json!({"name": name, "description": "d", "color": "aabbcc"})
    }

    #[tokio::test]
    async fn list_labels_follows_pagination() {
        let server = MockServer::start().await;
        let full_page: Vec<_> = (0..100).map(|i| label_json(&format!("l{i}"))).collect();
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/labels"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&full_page))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/labels"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([label_json("last")])))
            .mount(&server)
            .await;

        let labels = client(&server).list_labels(&repo()).await.expect("list");
        assert_eq!(labels.len(), 101);
        assert_eq!(labels[100].name, "last");
    }

    #[tokio::test]
    async fn list_labels_tolerates_null_descriptions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/labels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!([{"name": "bug", "description": null, "color": "ee0701"}]),
            ))
            .mount(&server)
            .await;

        let labels = client(&server).list_labels(&repo()).await.expect("list");
        assert_eq!(labels[0].description, "");
    }

    #[tokio::test]
    async fn create_conflict_maps_to_already_exists() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/widgets/labels"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Validation Failed",
                "errors": [{"resource": "Label", "code": "already_exists", "field": "name"}]
            })))
            .mount(&server)
            .await;

        let label = Label {
            name: "api: speech".into(),
            description: "Speech issues.".into(),
            color: "05fb61".into(),
        };
        let err = client(&server)
            .create_label(&repo(), &label)
            .await
            .expect_err("conflict");
        assert!(matches!(err, MutationError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn create_failure_carries_the_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/widgets/labels"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let label = Label {
            name: "api: speech".into(),
            description: String::new(),
            color: "05fb61".into(),
        };
        let err = client(&server)
            .create_label(&repo(), &label)
            .await
            .expect_err("failure");
        match err {
            MutationError::Api(api) => assert_eq!(api.status, Some(403)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn delete_hits_the_label_resource() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/repos/acme/widgets/labels/bug"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        client(&server)
            .delete_label(&repo(), "bug")
            .await
            .expect("delete");
    }

    #[tokio::test]
    async fn baseline_is_base64_decoded_and_parsed() {
        let server = MockServer::start().await;
        let doc =
            json!({"labels": [{"name": "priority: p1", "description": "Highest.", "color": "b60205"}]});
        let mut encoded = BASE64.encode(doc.to_string());
        // The contents endpoint inserts newlines into long base64 payloads.
        encoded.insert(10, '\n');
        Mock::given(method("GET"))
            .and(path("/repos/acme/settings/contents/labels.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"content": encoded, "encoding": "base64"})),
            )
            .mount(&server)
            .await;

        let labels = client(&server).fetch_baseline().await.expect("baseline");
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].name, "priority: p1");
    }

    #[tokio::test]
    async fn malformed_baseline_is_a_schema_error() {
        let server = MockServer::start().await;
        let encoded = BASE64.encode("{\"not_labels\": 1}");
        Mock::given(method("GET"))
            .and(path("/repos/acme/settings/contents/labels.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": encoded})))
            .mount(&server)
            .await;

        let err = client(&server).fetch_baseline().await.expect_err("schema");
        assert!(matches!(err, ConfigError::Schema { .. }));
    }
}
