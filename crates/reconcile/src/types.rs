//! Shared value types for the label reconciliation domain.
//!
//! The document-shaped types ([`Label`], [`Product`], [`RepoMapping`]) mirror
//! the centrally managed configuration documents; the plan and report types
//! carry a reconciliation run's intermediate and final results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifies a GitHub repository in `"owner/repo"` format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoPath(String);

impl RepoPath {
    /// Creates a [`RepoPath`] from separate owner and repository names.
    pub fn new(owner: &str, repo: &str) -> Self {
        Self(format!("{owner}/{repo}"))
    }

    /// Parses an `"owner/repo"` string, returning `None` unless both path
    /// segments are present and non-empty.
    pub fn parse(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        match v.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => Some(Self(v)),
            _ => None,
        }
    }

    /// Returns the owner (first path segment).
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map(|(owner, _)| owner).unwrap_or(&self.0)
    }

    /// Returns the repository name (second path segment).
    ///
    /// For a split repository this doubles as the product's API shortname.
    pub fn name(&self) -> &str {
        self.0.split_once('/').map(|(_, repo)| repo).unwrap_or(&self.0)
    }

    /// Returns the full `"owner/repo"` path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Identifies a single reconciliation run.
///
/// Generated fresh for every `reconcile` call; propagated through spans so all
/// activity from a single run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReconcileRunId(Uuid);

impl ReconcileRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ReconcileRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

/// A repository label.
///
/// `color` is a 6-character lowercase hex string without a `#` prefix.
/// Within one desired set no two names are equal case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name (e.g. `"api: translate"`).
    pub name: String,
    /// Human-readable description shown by the hosting platform.
    #[serde(default)]
    pub description: String,
    /// 6-character lowercase hex colour, no `#` prefix (e.g. `"7fd690"`).
    pub color: String,
}

/// One product from the centrally managed product catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Display name used in the generated label description (e.g. `"Cloud Translation"`).
    pub display_name: String,
    /// The literal label name to apply (e.g. `"api: translate"`).
    pub github_label: String,
    /// Short product identifier; input to colour derivation (e.g. `"translate"`).
    pub api_shortname: String,
}

/// One entry from the per-repository mapping document.
///
/// A non-empty `github_label` marks the repository as a split repo dedicated
/// to a single product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMapping {
    /// Repository in `"owner/repo"` format.
    pub repo: String,
    /// Product label for split repos; empty for mono repos.
    #[serde(default)]
    pub github_label: String,
}

// ---------------------------------------------------------------------------
// Mutation plan
// ---------------------------------------------------------------------------

/// A single create or update mutation targeting one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelChange {
    /// No label with this name exists under any casing.
    Create(Label),
    /// A label with this name exists but its colour or description drifted.
    Update {
        /// The name the label currently carries on the repository. Its
        /// casing is the identity key for the update call; the desired
        /// casing is re-asserted through `label.name`.
        current_name: String,
        /// The desired state of the label.
        label: Label,
    },
}

/// The minimal set of mutations needed to converge a repository.
///
/// `changes` preserves desired-set order. `deletes` is derived from the
/// deletion denylist independent of the desired set; a label may appear in
/// both halves, in which case both actions run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MutationPlan {
    /// Create/update mutations, in desired-set order.
    pub changes: Vec<LabelChange>,
    /// Names of denylisted labels present on the repository.
    pub deletes: Vec<String>,
}

impl MutationPlan {
    /// Returns `true` if the plan contains no mutations at all.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.deletes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reconciliation report
// ---------------------------------------------------------------------------

/// Which kind of mutation a failure relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        };
        write!(f, "{kind}")
    }
}

/// A recorded per-mutation failure.
///
/// Failures are isolated: one failing mutation never stops its siblings.
#[derive(Debug, Clone, Serialize)]
pub struct MutationFailure {
    /// The mutation that failed.
    pub operation: MutationKind,
    /// Name of the label the mutation targeted.
    pub label: String,
    /// Rendered cause, for logging by the dispatcher.
    pub message: String,
}

/// Summary of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    /// Repository the run converged.
    pub repo: RepoPath,
    /// Correlation id for this run.
    pub run: ReconcileRunId,
    /// Labels created (including creations that lost a benign race).
    pub created: usize,
    /// Labels updated.
    pub updated: usize,
    /// Denylisted labels deleted.
    pub deleted: usize,
    /// Mutations that failed; empty on full convergence.
    pub failures: Vec<MutationFailure>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl ReconcileReport {
    /// Returns `true` if every mutation the plan called for succeeded.
    pub fn is_converged(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_path_splits_owner_and_name() {
        let path = RepoPath::new("googleapis", "nodejs-translate");
        assert_eq!(path.owner(), "googleapis");
        assert_eq!(path.name(), "nodejs-translate");
        assert_eq!(path.as_str(), "googleapis/nodejs-translate");
    }

    #[test]
    fn repo_path_parse_rejects_malformed_input() {
        assert!(RepoPath::parse("no-slash").is_none());
        assert!(RepoPath::parse("/repo").is_none());
        assert!(RepoPath::parse("owner/").is_none());
        assert!(RepoPath::parse("owner/repo").is_some());
    }

    #[test]
    fn label_description_defaults_to_empty() {
        let label: Label =
            serde_json::from_str(r#"{"name": "p1", "color": "aabbcc"}"#).expect("parse");
        assert_eq!(label.description, "");
    }

    #[test]
    fn mapping_label_defaults_to_empty() {
        let mapping: RepoMapping =
            serde_json::from_str(r#"{"repo": "googleapis/foo"}"#).expect("parse");
        assert_eq!(mapping.github_label, "");
    }

    #[test]
    fn empty_plan_reports_empty() {
        assert!(MutationPlan::default().is_empty());
    }
}
