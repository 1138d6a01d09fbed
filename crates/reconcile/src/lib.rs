//! Core label reconciliation domain for label_works.
//!
//! This crate contains every domain concept, shared value type, cross-cutting
//! error type, and port trait used throughout the system, plus the
//! reconciliation engine itself. Infrastructure crates implement the traits
//! defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`types`] | Shared value types (`Label`, `Product`, `MutationPlan`, etc.) |
//! | [`errors`] | Error taxonomy (`ConfigError`, `MutationError`, `ReconcileError`) |
//! | [`ports`] | Port traits implemented by infrastructure (`LabelStore`, `CatalogStore`, `BaselineSource`) |
//! | [`color`] | Deterministic label colour derivation |
//! | [`baseline`] | Cached snapshot of the baseline label document |
//! | [`resolver`] | Split/mono product resolution |
//! | [`desired`] | Desired-state builder |
//! | [`differ`] | Desired-vs-actual diffing and the deletion denylist |
//! | [`engine`] | The reconciler: plan application and failure isolation |

pub mod baseline;
pub mod color;
pub mod desired;
pub mod differ;
pub mod engine;
pub mod errors;
pub mod ports;
pub mod resolver;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use baseline::BaselineCache;
pub use desired::DesiredStateBuilder;
pub use differ::{diff, DENYLIST};
pub use engine::Reconciler;
pub use errors::{ApiError, ConfigError, MutationError, ReconcileError};
pub use ports::{BaselineSource, CatalogStore, LabelStore};
pub use resolver::ProductResolver;
pub use types::{
    Label, LabelChange, MutationFailure, MutationKind, MutationPlan, Product, ReconcileReport,
    ReconcileRunId, RepoMapping, RepoPath,
};
