//! Paginated scanning of one endpoint.
//!
//! Pages are fetched in order starting at 0. Scanning an endpoint stops when:
//! - a page comes back empty (pagination exhausted),
//! - a page fails to load (treated like exhaustion, but reported separately),
//! - in incremental mode, a page yields nothing new on an endpoint that does
//!   not force refresh (its frontier was ingested by an earlier run),
//! - the page budget runs out.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::CatalogItem;
use crate::config::{EndpointConfig, SyncSettings};
use crate::enrich::Enricher;
use crate::normalizer::{Disposition, KnownIds, Normalizer};
use crate::remote::RemoteSource;

/// Page budget policy for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Small fixed budget; all-duplicate pages stop the scan.
    Incremental,
    /// First import: each endpoint's full budget, no early stop.
    Bootstrap,
}

/// Why a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    AllDuplicates,
    FetchFailed,
    BudgetReached,
}

/// Result of scanning one endpoint.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Accepted items, in page order.
    pub items: Vec<CatalogItem>,
    pub pages_fetched: u32,
    pub new_items: usize,
    pub refreshed_items: usize,
    pub stop_reason: StopReason,
}

/// Drives pagination for endpoints, normalizing and enriching each page.
pub struct CategoryScanner {
    remote: Arc<dyn RemoteSource>,
    normalizer: Normalizer,
    enricher: Enricher,
    incremental_page_budget: u32,
}

impl CategoryScanner {
    pub fn new(remote: Arc<dyn RemoteSource>, settings: &SyncSettings) -> Self {
        Self {
            normalizer: Normalizer::new(settings.id_namespace.clone()),
            enricher: Enricher::new(Arc::clone(&remote), settings.concurrency_limit),
            incremental_page_budget: settings.incremental_page_budget,
            remote,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Number of pages to try for `endpoint` under `mode`.
    pub fn page_budget(&self, endpoint: &EndpointConfig, mode: ScanMode) -> u32 {
        match mode {
            ScanMode::Incremental => self.incremental_page_budget,
            ScanMode::Bootstrap => endpoint.max_page_budget,
        }
    }

    /// Scan one endpoint, recording newly seen ids in `known`.
    pub async fn scan(
        &self,
        endpoint: &EndpointConfig,
        known: &mut KnownIds,
        mode: ScanMode,
    ) -> ScanOutcome {
        let budget = self.page_budget(endpoint, mode);
        let mut outcome = ScanOutcome {
            items: Vec::new(),
            pages_fetched: 0,
            new_items: 0,
            refreshed_items: 0,
            stop_reason: StopReason::BudgetReached,
        };

        info!(endpoint = %endpoint.display_name, budget, ?mode, "Checking endpoint");

        for page in 0..budget {
            let raw_items = match self.remote.fetch_page(endpoint, page).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(endpoint = %endpoint.display_name, page, error = %e, "Page fetch failed, stopping endpoint");
                    outcome.stop_reason = StopReason::FetchFailed;
                    break;
                }
            };
            outcome.pages_fetched += 1;

            if raw_items.is_empty() {
                debug!(endpoint = %endpoint.display_name, page, "No more results");
                outcome.stop_reason = StopReason::Exhausted;
                break;
            }

            let mut page_items = Vec::with_capacity(raw_items.len());
            for raw in raw_items {
                if let Some(normalized) = self.normalizer.normalize(raw, endpoint, known) {
                    match normalized.disposition {
                        Disposition::New => outcome.new_items += 1,
                        Disposition::Refresh => outcome.refreshed_items += 1,
                    }
                    page_items.push(normalized.item);
                }
            }

            self.enricher.enrich(&mut page_items).await;

            if page_items.is_empty() {
                if !endpoint.force_refresh && mode == ScanMode::Incremental {
                    info!(endpoint = %endpoint.display_name, page, "No new items, skipping rest");
                    outcome.stop_reason = StopReason::AllDuplicates;
                    break;
                }
                debug!(endpoint = %endpoint.display_name, page, "All skipped");
                continue;
            }

            info!(endpoint = %endpoint.display_name, page = page + 1, count = page_items.len(), "Processed page");
            outcome.items.extend(page_items);
        }

        outcome
    }
}
