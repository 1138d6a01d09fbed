//! Error taxonomy for label reconciliation.
//!
//! Three tiers, matching how far a failure is allowed to propagate:
//!
//! - [`ConfigError`] — a centrally managed configuration document could not
//!   be fetched or understood. Fatal for the run: reconciling against a
//!   missing or malformed desired state would delete-converge repositories
//!   toward garbage.
//! - [`ApiError`] — a hosting-platform call failed at the transport or HTTP
//!   level. Fatal only when it prevents listing the current labels.
//! - [`MutationError`] — a single create/update/delete call failed. Never
//!   fatal: recorded in the run's report and the remaining mutations proceed.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Configuration documents
// ---------------------------------------------------------------------------

/// Failure to fetch or interpret a configuration document (product catalog,
/// repository mapping, or baseline label document).
///
/// Propagates uncaught out of desired-state construction so the affected
/// repository's reconciliation aborts rather than proceeding with a partial
/// desired state.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be fetched from its store.
    #[error("failed to fetch {document}: {message}")]
    Fetch {
        /// Which document was being fetched (e.g. `"product catalog"`).
        document: &'static str,
        /// Rendered transport or HTTP-level cause.
        message: String,
    },

    /// The document was fetched but its raw content could not be decoded
    /// (e.g. invalid base64 from the contents endpoint).
    #[error("failed to decode {document}: {message}")]
    Decode {
        /// Which document was being decoded.
        document: &'static str,
        /// Rendered decoding cause.
        message: String,
    },

    /// The document decoded but did not match the expected schema.
    #[error("{document} did not match the expected schema: {message}")]
    Schema {
        /// Which document failed validation.
        document: &'static str,
        /// Rendered deserialisation cause.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Hosting platform
// ---------------------------------------------------------------------------

/// A hosting-platform API call failed.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status, when the request got far enough to receive one.
    pub status: Option<u16>,
    /// Rendered cause.
    pub message: String,
}

impl ApiError {
    /// An error that never received an HTTP response (connect failure,
    /// timeout, malformed response body).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// An error carrying the HTTP status the platform answered with.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

/// Failure of a single label mutation.
#[derive(Debug, Error)]
pub enum MutationError {
    /// A label with this name already exists.
    ///
    /// Benign: another reconciliation of the same repository created the
    /// label between our listing and this call. Suppressed by the engine —
    /// not even recorded as a failure.
    #[error("label '{name}' already exists")]
    AlreadyExists {
        /// The conflicting label name.
        name: String,
    },

    /// Any other API failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

// ---------------------------------------------------------------------------
// Whole-run failures
// ---------------------------------------------------------------------------

/// Fatal failure of a reconciliation run.
///
/// Per-mutation failures are never fatal; they are collected in the run's
/// [`crate::ReconcileReport`] instead.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Desired-state construction failed; the run never reached the diff.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The repository's current labels could not be listed; there is
    /// nothing to diff against.
    #[error("failed to list current labels: {0}")]
    List(#[from] ApiError),
}
