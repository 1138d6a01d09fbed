//! labelworks entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** — load `labelworks.toml` (path overridable via
//!    `LABELWORKS_CONFIG`) and validate it.
//! 2. **Wire observability** — configure `tracing-subscriber` with a JSON
//!    layer and, when configured, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure** — create the GitHub client, the config
//!    object store, and the baseline cache, and inject them into the
//!    [`reconcile::Reconciler`].
//! 4. **Serve triggers** — bind the webhook listener and dispatch
//!    reconciliation runs until shutdown.

mod config;
mod telemetry;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use github::GithubClient;
use listener::AppState;
use reconcile::{BaselineCache, DesiredStateBuilder, ProductResolver, Reconciler};
use storage::HttpConfigStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("LABELWORKS_CONFIG")
        .unwrap_or_else(|_| "labelworks.toml".to_string());
    let config = config::load(Path::new(&config_path))?;
    telemetry::init(config.otlp_endpoint.as_deref())?;

    let github = Arc::new(
        GithubClient::new(config.github.clone()).context("building the GitHub client")?,
    );
    let catalog = Arc::new(
        HttpConfigStore::new(config.storage.clone()).context("building the config store")?,
    );
    let baseline = Arc::new(BaselineCache::new(github.clone()));
    let resolver = ProductResolver::new(catalog);
    let desired = DesiredStateBuilder::new(baseline, resolver);
    let engine = Arc::new(Reconciler::new(github, desired));

    let state = Arc::new(AppState::new(engine, config.webhook_secret.clone()));
    let app = listener::router(state);

    let socket = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!(addr = %config.bind, "labelworks listening");
    axum::serve(socket, app)
        .await
        .context("serving the webhook listener")?;
    Ok(())
}
