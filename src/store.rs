//! Catalog store - load lifecycle around an immutable snapshot
//!
//! State machine: `Idle -> Loading -> Ready | Failed`. Reload goes back
//! through `Loading`. Only one load runs at a time; a load requested while
//! another is in flight is a no-op (`LoadOutcome::AlreadyLoading`).
//!
//! The catalog itself lives behind an `Arc` that is swapped in one step on
//! success. Readers take a snapshot and keep it as long as they like, so a
//! reload can never be observed half-applied. A failed reload leaves the
//! previous snapshot visible.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::catalog::Catalog;
use crate::error::LoadError;

/// Where the catalog JSON comes from
#[derive(Debug, Clone)]
pub enum CatalogSource {
    File(PathBuf),
    Http { url: String, client: reqwest::Client },
}

impl CatalogSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        CatalogSource::File(path.into())
    }

    pub fn http(url: impl Into<String>, timeout: Duration) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(CatalogSource::Http { url: url.into(), client })
    }

    /// Human-readable location, for logs
    pub fn describe(&self) -> String {
        match self {
            CatalogSource::File(path) => path.display().to_string(),
            CatalogSource::Http { url, .. } => url.clone(),
        }
    }

    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        match self {
            CatalogSource::File(path) => tokio::fs::read(path).await.map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            }),
            CatalogSource::Http { url, client } => {
                let response = client.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        status: status.as_u16(),
                        reason: status.canonical_reason().unwrap_or("").to_string(),
                    });
                }
                Ok(response.bytes().await?.to_vec())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    /// Human-readable reason, suitable for a retry prompt
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub records: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(LoadReport),
    /// Another load was already in flight; nothing was done.
    AlreadyLoading,
}

struct StoreInner {
    state: LoadState,
    catalog: Arc<Catalog>,
}

/// Owns the session's catalog. Construct once and hand out `Arc<CatalogStore>`.
pub struct CatalogStore {
    source: CatalogSource,
    inner: RwLock<StoreInner>,
    load_gate: Mutex<()>,
}

impl CatalogStore {
    pub fn new(source: CatalogSource) -> Self {
        Self {
            source,
            inner: RwLock::new(StoreInner {
                state: LoadState::Idle,
                catalog: Arc::new(Catalog::default()),
            }),
            load_gate: Mutex::new(()),
        }
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    pub fn state(&self) -> LoadState {
        self.read_inner().state.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.read_inner().state == LoadState::Ready
    }

    /// Current catalog. Empty before the first successful load; stale after a failed reload.
    pub fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.read_inner().catalog)
    }

    /// Fetch, parse and validate the catalog, then swap it in.
    pub async fn load(&self) -> Result<LoadOutcome, LoadError> {
        let _gate = match self.load_gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::debug!("Catalog load already in flight; ignoring request");
                return Ok(LoadOutcome::AlreadyLoading);
            }
        };

        self.set_state(LoadState::Loading);
        let start = Instant::now();

        match self.fetch_catalog().await {
            Ok(catalog) => {
                let report = LoadReport {
                    records: catalog.len(),
                    dropped: catalog.dropped(),
                };
                {
                    let mut inner = self.write_inner();
                    inner.catalog = Arc::new(catalog);
                    inner.state = LoadState::Ready;
                }
                tracing::info!(
                    dropped = report.dropped,
                    elapsed = ?start.elapsed(),
                    "Loaded {} mushroom species",
                    report.records
                );
                Ok(LoadOutcome::Loaded(report))
            }
            Err(err) => {
                tracing::error!(source = %self.source.describe(), "Error loading mushroom data: {}", err);
                self.set_state(LoadState::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Same as `load`; replaces the catalog wholesale on success.
    pub async fn reload(&self) -> Result<LoadOutcome, LoadError> {
        tracing::info!(source = %self.source.describe(), "Reloading mushroom catalog");
        self.load().await
    }

    async fn fetch_catalog(&self) -> Result<Catalog, LoadError> {
        let bytes = self.source.fetch().await?;
        Catalog::from_json_slice(&bytes)
    }

    fn set_state(&self, state: LoadState) {
        self.write_inner().state = state;
    }

    fn read_inner(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
