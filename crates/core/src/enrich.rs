//! Season enrichment for series items.
//!
//! Series are fetched in fixed-size batches: every request of a batch runs
//! concurrently and the next batch starts only once the whole batch has
//! finished, so at most `concurrency_limit` requests are ever in flight.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::catalog::CatalogItem;
use crate::remote::RemoteSource;

/// Statistics from an enrichment pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentStats {
    /// Series items a season listing was requested for.
    pub requested: u32,
    /// Items that received a season listing.
    pub enriched: u32,
    /// Items the API had no listing for.
    pub missing: u32,
    /// Items whose request failed.
    pub failed: u32,
    /// Number of batches issued.
    pub batches: u32,
}

/// Fills in `seasons` on series items.
pub struct Enricher {
    remote: Arc<dyn RemoteSource>,
    concurrency_limit: usize,
}

impl Enricher {
    /// Create a new enricher. A limit of 0 is treated as 1.
    pub fn new(remote: Arc<dyn RemoteSource>, concurrency_limit: usize) -> Self {
        Self {
            remote,
            concurrency_limit: concurrency_limit.max(1),
        }
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Enrich series items in place. Movies are left untouched, and an item
    /// whose request fails keeps `seasons` unset without affecting the others.
    pub async fn enrich(&self, items: &mut [CatalogItem]) -> EnrichmentStats {
        let mut stats = EnrichmentStats::default();

        let mut queue: Vec<&mut CatalogItem> =
            items.iter_mut().filter(|item| item.is_series()).collect();

        if queue.is_empty() {
            return stats;
        }

        debug!(
            count = queue.len(),
            batch_size = self.concurrency_limit,
            "Fetching season listings"
        );

        for batch in queue.chunks_mut(self.concurrency_limit) {
            stats.batches += 1;
            stats.requested += batch.len() as u32;

            let results = join_all(
                batch
                    .iter()
                    .map(|item| self.remote.fetch_seasons(&item.real_id)),
            )
            .await;

            for (item, result) in batch.iter_mut().zip(results) {
                match result {
                    Ok(Some(seasons)) => {
                        item.seasons = Some(seasons);
                        stats.enriched += 1;
                    }
                    Ok(None) => {
                        debug!(id = %item.id, "No season listing");
                        stats.missing += 1;
                    }
                    Err(e) => {
                        warn!(id = %item.id, error = %e, "Failed to fetch season listing");
                        stats.failed += 1;
                    }
                }
            }
        }

        stats
    }
}
