pub mod file;

use crate::errors::UpstreamError;
use crate::exchanges::SnapshotSource;
use crate::models::{ContractRecord, Snapshot};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;
pub use file::FileCache;

/// A snapshot taken at `fetched_at` may still be served at `now`.
/// Snapshots stamped in the future count as fresh.
pub fn is_fresh(fetched_at: DateTime<Utc>, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
    now.signed_duration_since(fetched_at) < ttl
}

/// Wraps a source with a disk-backed time-to-live cache.
///
/// Callers are not coordinated: two loads that both see an expired snapshot
/// both go upstream and both write, and the last write wins.
pub struct CachedSource<S> {
    inner: S,
    cache: FileCache,
    ttl: TimeDelta,
}

impl<S: SnapshotSource> CachedSource<S> {
    pub fn new(inner: S, cache: FileCache, ttl: Duration) -> Self {
        Self {
            inner,
            cache,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    pub async fn get_snapshot(&self) -> Result<Vec<ContractRecord>, UpstreamError> {
        self.get_snapshot_at(Utc::now()).await
    }

    /// Cache problems are never returned: an unreadable artifact is a miss and
    /// a failed write still hands back the fresh data.
    pub async fn get_snapshot_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<ContractRecord>, UpstreamError> {
        match self.cache.load().await {
            Ok(Some(snapshot)) if is_fresh(snapshot.fetched_at, now, self.ttl) => {
                let age = now.signed_duration_since(snapshot.fetched_at);
                tracing::info!(
                    "snapshot cache hit ({} records, age {}s)",
                    snapshot.data.len(),
                    age.num_seconds()
                );
                metrics::counter!("snapshot_cache_total", "operation" => "hit").increment(1);
                return Ok(snapshot.data);
            }
            Ok(Some(snapshot)) => {
                tracing::debug!("snapshot cache expired (fetched at {})", snapshot.fetched_at);
            }
            Ok(None) => {
                tracing::debug!("no snapshot cached at {}", self.cache.path().display());
            }
            Err(e) => {
                tracing::warn!("ignoring unreadable snapshot cache: {e}");
            }
        }
        metrics::counter!("snapshot_cache_total", "operation" => "miss").increment(1);

        let snapshot = Snapshot {
            data: self.inner.fetch_snapshot().await?,
            fetched_at: now,
        };

        if let Err(e) = self.cache.store(&snapshot).await {
            tracing::warn!(
                "failed to write snapshot cache {}: {e}",
                self.cache.path().display()
            );
            metrics::counter!("snapshot_cache_write_errors_total").increment(1);
        }

        Ok(snapshot.data)
    }
}

#[async_trait]
impl<S: SnapshotSource> SnapshotSource for CachedSource<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn fetch_snapshot(&self) -> Result<Vec<ContractRecord>, UpstreamError> {
        self.get_snapshot().await
    }
}
