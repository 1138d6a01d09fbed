//! Configuration loading for the labelworks binary.
//!
//! Configuration comes from a TOML file, with the two secrets (API token,
//! webhook secret) overridable through the environment so they stay out of
//! the file. Validation happens here, at load time; the process never starts
//! with an incomplete configuration.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use github::{BaselineLocation, GithubConfig};
use storage::StorageConfig;

/// Fully validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub github: GithubConfig,
    pub storage: StorageConfig,
    /// Address the webhook listener binds to.
    pub bind: String,
    /// Secret used to verify webhook delivery signatures.
    pub webhook_secret: String,
    /// OTLP collector endpoint; span export is disabled when unset.
    pub otlp_endpoint: Option<String>,
}

// ---------------------------------------------------------------------------
// File schema
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    github: RawGithub,
    storage: RawStorage,
    #[serde(default)]
    listener: RawListener,
    #[serde(default)]
    telemetry: RawTelemetry,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGithub {
    /// Falls back to `GITHUB_TOKEN` when absent.
    #[serde(default)]
    token: Option<String>,
    #[serde(default = "default_api_base")]
    api_base: String,
    baseline: BaselineLocation,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStorage {
    bucket: String,
    #[serde(default = "default_storage_base")]
    base_url: String,
    #[serde(default = "default_catalog_object")]
    catalog_object: String,
    #[serde(default = "default_mapping_object")]
    mapping_object: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawListener {
    #[serde(default = "default_bind")]
    bind: String,
    /// Falls back to `WEBHOOK_SECRET` when absent.
    #[serde(default)]
    webhook_secret: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTelemetry {
    #[serde(default)]
    otlp_endpoint: Option<String>,
}

fn default_api_base() -> String {
    GithubConfig::DEFAULT_API_BASE.to_string()
}

fn default_storage_base() -> String {
    StorageConfig::DEFAULT_BASE_URL.to_string()
}

fn default_catalog_object() -> String {
    StorageConfig::DEFAULT_CATALOG_OBJECT.to_string()
}

fn default_mapping_object() -> String {
    StorageConfig::DEFAULT_MAPPING_OBJECT.to_string()
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Loads and validates the configuration file at `path`.
pub fn load(path: &Path) -> anyhow::Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading configuration from {}", path.display()))?;
    parse(&raw, &|key| std::env::var(key).ok())
}

/// Parses `raw` as the configuration file, resolving secrets through `env`.
fn parse(raw: &str, env: &dyn Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
    let raw: RawConfig = toml::from_str(raw).context("parsing configuration")?;

    let token = raw
        .github
        .token
        .or_else(|| env("GITHUB_TOKEN"))
        .context("github.token is not set and GITHUB_TOKEN is unset")?;
    let webhook_secret = raw
        .listener
        .webhook_secret
        .or_else(|| env("WEBHOOK_SECRET"))
        .context("listener.webhook_secret is not set and WEBHOOK_SECRET is unset")?;

    Ok(Config {
        github: GithubConfig {
            token,
            api_base: raw.github.api_base,
            baseline: raw.github.baseline,
        },
        storage: StorageConfig {
            base_url: raw.storage.base_url,
            bucket: raw.storage.bucket,
            catalog_object: raw.storage.catalog_object,
            mapping_object: raw.storage.mapping_object,
        },
        bind: raw.listener.bind,
        webhook_secret,
        otlp_endpoint: raw.telemetry.otlp_endpoint,
    })
}

impl Default for RawListener {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            webhook_secret: None,
        }
    }
}
