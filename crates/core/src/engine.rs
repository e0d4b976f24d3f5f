//! One synchronization pass.
//!
//! Load the snapshot, scan every configured endpoint against the ids already
//! known, merge what was found into the pending tier, compact if the pending
//! tier grew too large, and save, but only if anything was processed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{EndpointConfig, SyncConfig, SyncMode};
use crate::remote::RemoteSource;
use crate::scanner::{CategoryScanner, ScanMode, ScanOutcome, StopReason};
use crate::snapshot::{
    CompactionStats, LoadReport, MergeStats, Snapshot, SnapshotStore, StoreError,
};

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Snapshot storage error: {0}")]
    Store(#[from] StoreError),
}

/// Per-endpoint summary.
#[derive(Debug, Clone)]
pub struct EndpointReport {
    pub path: String,
    pub display_name: String,
    pub pages_fetched: u32,
    pub new_items: usize,
    pub refreshed_items: usize,
    pub stop_reason: StopReason,
}

impl EndpointReport {
    fn new(endpoint: &EndpointConfig, outcome: &ScanOutcome) -> Self {
        Self {
            path: endpoint.path.clone(),
            display_name: endpoint.display_name.clone(),
            pages_fetched: outcome.pages_fetched,
            new_items: outcome.new_items,
            refreshed_items: outcome.refreshed_items,
            stop_reason: outcome.stop_reason,
        }
    }

    pub fn processed(&self) -> usize {
        self.new_items + self.refreshed_items
    }
}

/// Summary of a run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub mode: ScanMode,
    /// Items added or updated across all endpoints.
    pub processed: usize,
    pub endpoints: Vec<EndpointReport>,
    pub merge: MergeStats,
    pub compaction: Option<CompactionStats>,
    /// Whether the snapshot files were written.
    pub saved: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Runs synchronization passes against a remote source and a snapshot store.
pub struct SyncEngine {
    config: SyncConfig,
    scanner: CategoryScanner,
    store: SnapshotStore,
}

impl SyncEngine {
    pub fn new(config: SyncConfig, remote: Arc<dyn RemoteSource>, store: SnapshotStore) -> Self {
        let scanner = CategoryScanner::new(remote, &config.sync);
        Self {
            config,
            scanner,
            store,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Scan mode for a run starting from `snapshot`.
    ///
    /// `Auto` bootstraps only on a genuine first run: an empty snapshot that
    /// did not become empty by quarantining an unreadable file.
    pub fn resolve_mode(&self, snapshot: &Snapshot, load: &LoadReport) -> ScanMode {
        match self.config.sync.mode {
            SyncMode::Incremental => ScanMode::Incremental,
            SyncMode::Bootstrap => ScanMode::Bootstrap,
            SyncMode::Auto if !snapshot.is_empty() => ScanMode::Incremental,
            SyncMode::Auto if load.is_clean() => ScanMode::Bootstrap,
            SyncMode::Auto => {
                warn!(
                    quarantined = load.quarantined.len(),
                    "Snapshot empty after recovery, staying incremental"
                );
                ScanMode::Incremental
            }
        }
    }

    /// Load, synchronize, and persist.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let started_at = Utc::now();
        info!("Sync started");

        let (mut snapshot, load) = self.store.load_with_report()?;
        let mode = self.resolve_mode(&snapshot, &load);
        let mut report = self.sync_snapshot(&mut snapshot, mode).await;
        report.started_at = started_at;

        if report.processed > 0 {
            info!(processed = report.processed, "Saving changes");
            self.store.save(&snapshot)?;
            report.saved = true;
        } else {
            info!("No changes");
        }

        report.finished_at = Utc::now();
        Ok(report)
    }

    /// Run every endpoint against an in-memory snapshot, merging and
    /// compacting it. Nothing is persisted.
    pub async fn sync_snapshot(&self, snapshot: &mut Snapshot, mode: ScanMode) -> SyncReport {
        let started_at = Utc::now();
        let mut known = snapshot.known_ids();
        let mut endpoints = Vec::with_capacity(self.config.endpoints.len());
        let mut merge = MergeStats::default();
        let mut processed = 0;

        info!(known = known.len(), ?mode, "Scanning endpoints");

        for endpoint in &self.config.endpoints {
            let outcome = self.scanner.scan(endpoint, &mut known, mode).await;
            let endpoint_report = EndpointReport::new(endpoint, &outcome);

            if !outcome.items.is_empty() {
                processed += outcome.items.len();
                merge += snapshot.merge(outcome.items);
            }

            info!(
                endpoint = %endpoint_report.display_name,
                new = endpoint_report.new_items,
                refreshed = endpoint_report.refreshed_items,
                pages = endpoint_report.pages_fetched,
                stop = ?endpoint_report.stop_reason,
                "Endpoint done"
            );
            endpoints.push(endpoint_report);
        }

        info!(processed, "Processed {} items", processed);

        let compaction = snapshot.compact_if_needed(self.config.sync.compaction_threshold);

        SyncReport {
            mode,
            processed,
            endpoints,
            merge,
            compaction,
            saved: false,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
