use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::domain::RadarSnapshot;
use super::source::SheetSource;
use super::{LoaderError, RadarLoader};

struct CachedSnapshot {
    snapshot: Arc<RadarSnapshot>,
    loaded: Instant,
}

/// Holds the last successfully loaded snapshot for `ttl`.
///
/// A failed reload clears the slot, so an expired snapshot is never served.
pub struct SnapshotCache {
    source: Arc<dyn SheetSource>,
    ttl: Duration,
    slot: RwLock<Option<CachedSnapshot>>,
}

impl SnapshotCache {
    pub fn new(source: Arc<dyn SheetSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            slot: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached snapshot while fresh, otherwise a reload.
    pub async fn current(&self) -> Result<Arc<RadarSnapshot>, LoaderError> {
        {
            let slot = self.slot.read().await;
            if let Some(cached) = slot.as_ref() {
                if cached.loaded.elapsed() < self.ttl {
                    return Ok(Arc::clone(&cached.snapshot));
                }
            }
        }

        let mut slot = self.slot.write().await;
        // Another request may have reloaded while this one waited for the write lock.
        if let Some(cached) = slot.as_ref() {
            if cached.loaded.elapsed() < self.ttl {
                return Ok(Arc::clone(&cached.snapshot));
            }
        }

        debug!("radar snapshot expired or absent; reloading");
        self.reload_into(&mut slot).await
    }

    /// Reload unconditionally.
    pub async fn refresh(&self) -> Result<Arc<RadarSnapshot>, LoaderError> {
        let mut slot = self.slot.write().await;
        self.reload_into(&mut slot).await
    }

    pub async fn invalidate(&self) {
        self.slot.write().await.take();
    }

    async fn reload_into(
        &self,
        slot: &mut Option<CachedSnapshot>,
    ) -> Result<Arc<RadarSnapshot>, LoaderError> {
        match RadarLoader::load(self.source.as_ref()).await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *slot = Some(CachedSnapshot {
                    snapshot: Arc::clone(&snapshot),
                    loaded: Instant::now(),
                });
                Ok(snapshot)
            }
            Err(error) => {
                warn!(%error, "radar reload failed; cache cleared");
                *slot = None;
                Err(error)
            }
        }
    }
}
