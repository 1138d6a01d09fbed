//! The reconciler: plan application and failure isolation.

use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;

use crate::desired::DesiredStateBuilder;
use crate::differ;
use crate::errors::{MutationError, ReconcileError};
use crate::ports::LabelStore;
use crate::types::{
    LabelChange, MutationFailure, MutationKind, ReconcileReport, ReconcileRunId, RepoPath,
};

/// Converges one repository's labels toward the desired state.
pub struct Reconciler {
    labels: Arc<dyn LabelStore>,
    desired: DesiredStateBuilder,
}

impl Reconciler {
    pub fn new(labels: Arc<dyn LabelStore>, desired: DesiredStateBuilder) -> Self {
        Self { labels, desired }
    }

    /// Runs one reconciliation of `repo`.
    ///
    /// Only desired-state construction and the current-label listing can fail
    /// the run. Every individual mutation failure is recorded in the returned
    /// report and never stops the remaining mutations. Creates and updates
    /// run before the denylist deletion pass; within each phase mutations are
    /// issued one at a time.
    pub async fn reconcile(&self, repo: &RepoPath) -> Result<ReconcileReport, ReconcileError> {
        let run = ReconcileRunId::new_random();
        let span = tracing::info_span!("reconcile", repo = %repo, run = %run);
        self.reconcile_inner(repo, run).instrument(span).await
    }

    async fn reconcile_inner(
        &self,
        repo: &RepoPath,
        run: ReconcileRunId,
    ) -> Result<ReconcileReport, ReconcileError> {
        let desired = self.desired.build(repo).await?;
        let actual = self
            .labels
            .list_labels(repo)
            .await
            .map_err(ReconcileError::List)?;
        let plan = differ::diff(&desired, &actual);

        let mut report = ReconcileReport {
            repo: repo.clone(),
            run,
            created: 0,
            updated: 0,
            deleted: 0,
            failures: Vec::new(),
            finished_at: Utc::now(),
        };

        if plan.is_empty() {
            tracing::debug!("labels already converged");
            return Ok(report);
        }

        for change in &plan.changes {
            match change {
                LabelChange::Create(label) => {
                    match self.labels.create_label(repo, label).await {
                        Ok(()) => {
                            tracing::info!(label = %label.name, "created label");
                            report.created += 1;
                        }
                        Err(MutationError::AlreadyExists { .. }) => {
                            // Another reconciliation of this repository got
                            // there first; the label exists, which is what
                            // this run wanted.
                            tracing::debug!(label = %label.name, "label already exists");
                            report.created += 1;
                        }
                        Err(err) => {
                            tracing::warn!(label = %label.name, error = %err, "failed to create label");
                            report.failures.push(MutationFailure {
                                operation: MutationKind::Create,
                                label: label.name.clone(),
                                message: err.to_string(),
                            });
                        }
                    }
                }
                LabelChange::Update { current_name, label } => {
                    match self.labels.update_label(repo, current_name, label).await {
                        Ok(()) => {
                            tracing::info!(label = %label.name, "updated label");
                            report.updated += 1;
                        }
                        Err(err) => {
                            tracing::warn!(label = %label.name, error = %err, "failed to update label");
                            report.failures.push(MutationFailure {
                                operation: MutationKind::Update,
                                label: label.name.clone(),
                                message: err.to_string(),
                            });
                        }
                    }
                }
            }
        }

        for name in &plan.deletes {
            match self.labels.delete_label(repo, name).await {
                Ok(()) => {
                    tracing::info!(label = %name, "deleted denylisted label");
                    report.deleted += 1;
                }
                Err(err) => {
                    // Deleting an already-deleted label fails harmlessly;
                    // recorded like any other mutation failure.
                    tracing::warn!(label = %name, error = %err, "failed to delete label");
                    report.failures.push(MutationFailure {
                        operation: MutationKind::Delete,
                        label: name.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        report.finished_at = Utc::now();
        tracing::info!(
            created = report.created,
            updated = report.updated,
            deleted = report.deleted,
            failed = report.failures.len(),
            "reconciliation finished"
        );
        Ok(report)
    }
}
