//! Cached snapshot of the baseline label document.
//!
//! The baseline document lives in a version-controlled repository and changes
//! rarely, so it is fetched once and then reused by every reconciliation in
//! the process. Refreshing replaces the whole snapshot atomically; concurrent
//! refreshes race harmlessly (last writer wins, readers always observe a
//! complete snapshot).

use std::sync::{Arc, PoisonError, RwLock};

use crate::errors::ConfigError;
use crate::ports::BaselineSource;
use crate::types::Label;

/// Process-scoped, lazily populated cache of the baseline label list.
pub struct BaselineCache {
    source: Arc<dyn BaselineSource>,
    snapshot: RwLock<Option<Arc<Vec<Label>>>>,
}

impl BaselineCache {
    /// Creates an empty cache over `source`. Nothing is fetched until the
    /// first [`get`](Self::get) or [`refresh`](Self::refresh).
    pub fn new(source: Arc<dyn BaselineSource>) -> Self {
        Self {
            source,
            snapshot: RwLock::new(None),
        }
    }

    /// Returns the current snapshot, refreshing first if the cache has never
    /// been populated.
    ///
    /// On a cold cache, concurrent callers may each trigger a fetch; that is
    /// duplicate work, not corruption.
    pub async fn get(&self) -> Result<Arc<Vec<Label>>, ConfigError> {
        if let Some(snapshot) = self.read_snapshot() {
            return Ok(snapshot);
        }
        self.refresh().await
    }

    /// Fetches the baseline document and replaces the cached snapshot,
    /// returning the snapshot it installed.
    ///
    /// Fetch and parse failures propagate as [`ConfigError`]; the previous
    /// snapshot, if any, stays in place.
    pub async fn refresh(&self) -> Result<Arc<Vec<Label>>, ConfigError> {
        let labels = Arc::new(self.source.fetch_baseline().await?);
        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(Arc::clone(&labels));
        Ok(labels)
    }

    fn read_snapshot(&self) -> Option<Arc<Vec<Label>>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
