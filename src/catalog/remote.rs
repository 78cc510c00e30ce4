//! Network-backed catalog with one-shot memoization.
//!
//! The fetch itself (transport, timeout, retries) belongs to the provider
//! implementation; this module only owns the memoization. Callers that need
//! determinism across concurrent computations should fetch a [`Catalog`]
//! snapshot once and pass it around explicitly instead of sharing a
//! [`MemoizedCatalog`] mid-computation.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OnceCell;

use super::Catalog;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog fetch failed: {0}")]
    Fetch(String),
}

/// Source of catalog snapshots, typically backed by the booking service API.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetches a complete catalog snapshot.
    async fn fetch_catalog(&self) -> Result<Catalog, CatalogError>;
}

/// Caches the first successful fetch from a [`CatalogProvider`].
///
/// Failed fetches are not cached; the next call retries. Once warm, the
/// async usage path is functionally identical to the sync path with an
/// explicit snapshot.
#[derive(Debug)]
pub struct MemoizedCatalog<P: CatalogProvider> {
    provider: P,
    cache: OnceCell<Catalog>,
}

impl<P: CatalogProvider> MemoizedCatalog<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            cache: OnceCell::new(),
        }
    }

    /// Returns the memoized snapshot, fetching it on first use.
    pub async fn snapshot(&self) -> Result<&Catalog, CatalogError> {
        self.cache
            .get_or_try_init(|| self.provider.fetch_catalog())
            .await
    }

    /// Returns the snapshot if one has already been fetched.
    pub fn cached(&self) -> Option<&Catalog> {
        self.cache.get()
    }
}
