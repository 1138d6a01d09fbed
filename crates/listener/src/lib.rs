//! label_works trigger infrastructure.
//!
//! Receives GitHub webhook deliveries over HTTP, verifies their HMAC-SHA256
//! signatures, and dispatches reconciliation runs:
//!
//! - `repository.created`, `repository.transferred`, `label.edited`,
//!   `label.deleted`, and the scheduler's synthetic `schedule.repository`
//!   each reconcile the delivery's repository;
//! - `installation_repositories.added` fans out one independent task per
//!   added repository and waits for every member to settle — a failing
//!   member never cancels or fails its siblings.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport, signature verification, and payload
//! deserialization live here. The [`reconcile`] crate sees nothing of HTTP.

pub mod events;
pub mod signature;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tokio::task::JoinSet;

use reconcile::{ReconcileError, ReconcileReport, Reconciler, RepoPath};

use events::Trigger;

/// Shared state for the webhook handlers.
pub struct AppState {
    engine: Arc<Reconciler>,
    webhook_secret: String,
}

impl AppState {
    pub fn new(engine: Arc<Reconciler>, webhook_secret: String) -> Self {
        Self {
            engine,
            webhook_secret,
        }
    }
}

/// Builds the listener's router: `POST /webhook` and `GET /healthz`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, StatusCode> {
    let signature = headers
        .get("X-Hub-Signature-256")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !signature::verify_signature(&body, signature, &state.webhook_secret) {
        tracing::warn!("rejected delivery with missing or invalid signature");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let event = headers
        .get("X-GitHub-Event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    let delivery = headers
        .get("X-GitHub-Delivery")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    tracing::info!(event = %event, delivery = %delivery, "received webhook delivery");

    let trigger = events::trigger_for(event, &body).map_err(|e| {
        tracing::error!(event = %event, error = %e, "failed to parse webhook payload");
        StatusCode::BAD_REQUEST
    })?;

    match trigger {
        None => Ok(Json(json!({"status": "ignored"}))),
        Some(Trigger::Single(repo)) => match state.engine.reconcile(&repo).await {
            Ok(report) => Ok(Json(report_json(&report))),
            Err(err) => {
                tracing::error!(repo = %repo, error = %err, "reconciliation aborted");
                Err(StatusCode::BAD_GATEWAY)
            }
        },
        Some(Trigger::Batch(repos)) => {
            let outcomes = reconcile_batch(Arc::clone(&state.engine), repos).await;
            let failed = outcomes.iter().filter(|(_, r)| r.is_err()).count();
            Ok(Json(json!({
                "status": "ok",
                "reconciled": outcomes.len() - failed,
                "failed": failed,
            })))
        }
    }
}

fn report_json(report: &ReconcileReport) -> Value {
    json!({
        "status": "ok",
        "repo": report.repo.as_str(),
        "created": report.created,
        "updated": report.updated,
        "deleted": report.deleted,
        "failed": report.failures.len(),
    })
}

/// Reconciles a batch of repositories as independent concurrent tasks,
/// waiting for every member to settle.
pub async fn reconcile_batch(
    engine: Arc<Reconciler>,
    repos: Vec<RepoPath>,
) -> Vec<(RepoPath, Result<ReconcileReport, ReconcileError>)> {
    let mut tasks = JoinSet::new();
    for repo in repos {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            let outcome = engine.reconcile(&repo).await;
            if let Err(err) = &outcome {
                tracing::error!(repo = %repo, error = %err, "batch member failed");
            }
            (repo, outcome)
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => outcomes.push(outcome),
            // A panicking member is isolated just like an erroring one.
            Err(err) => tracing::error!(error = %err, "reconciliation task panicked"),
        }
    }
    outcomes
}
