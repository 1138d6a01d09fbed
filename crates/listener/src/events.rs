//! Webhook payload parsing and trigger mapping.
//!
//! Maps each incoming delivery to the reconciliation work it calls for:
//! nothing, one repository, or a batch of repositories. Payload shapes are
//! the minimal subsets of GitHub's webhook schemas this bot reads.

use reconcile::RepoPath;
use serde::Deserialize;

/// The reconciliation work one webhook delivery triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Reconcile a single repository.
    Single(RepoPath),
    /// Reconcile every repository in the batch as independent tasks.
    Batch(Vec<RepoPath>),
}

#[derive(Debug, Deserialize)]
struct RepositoryRep {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryScopedEvent {
    action: String,
    repository: RepositoryRep,
}

#[derive(Debug, Deserialize)]
struct InstallationRepositoriesEvent {
    action: String,
    #[serde(default)]
    repositories_added: Vec<RepositoryRep>,
}

/// Decides what work the delivery `event` (the `X-GitHub-Event` header value)
/// with `body` triggers.
///
/// Deliveries for events or actions this bot does not react to map to
/// `Ok(None)`. A body that does not parse as the expected payload shape is an
/// error; the caller answers 400.
pub fn trigger_for(event: &str, body: &[u8]) -> Result<Option<Trigger>, serde_json::Error> {
    match event {
        "repository" => {
            let payload: RepositoryScopedEvent = serde_json::from_slice(body)?;
            match payload.action.as_str() {
                "created" | "transferred" => Ok(single(&payload.repository)),
                _ => Ok(None),
            }
        }
        "label" => {
            let payload: RepositoryScopedEvent = serde_json::from_slice(body)?;
            match payload.action.as_str() {
                "edited" | "deleted" => Ok(single(&payload.repository)),
                _ => Ok(None),
            }
        }
        // Synthetic per-repository event emitted by the external scheduler.
        "schedule" => {
            let payload: RepositoryScopedEvent = serde_json::from_slice(body)?;
            match payload.action.as_str() {
                "repository" => Ok(single(&payload.repository)),
                _ => Ok(None),
            }
        }
        "installation_repositories" => {
            let payload: InstallationRepositoriesEvent = serde_json::from_slice(body)?;
            if payload.action != "added" {
                return Ok(None);
            }
            let repos: Vec<RepoPath> = payload
                .repositories_added
                .iter()
                .filter_map(|r| parse_repo(r))
                .collect();
            if repos.is_empty() {
                Ok(None)
            } else {
                Ok(Some(Trigger::Batch(repos)))
            }
        }
        _ => Ok(None),
    }
}

fn single(repository: &RepositoryRep) -> Option<Trigger> {
    parse_repo(repository).map(Trigger::Single)
}

fn parse_repo(repository: &RepositoryRep) -> Option<RepoPath> {
    let parsed = RepoPath::parse(repository.full_name.clone());
    if parsed.is_none() {
        tracing::warn!(full_name = %repository.full_name, "malformed repository path in payload");
    }
    parsed
}
