//! Two-tier persisted catalog state.
//!
//! The snapshot is split into a small hot `pending` tier (recently added or
//! updated items, newest first) and a large cold `archive` tier. After a merge
//! settles, an id lives in at most one tier; until compaction runs, a pending
//! item may shadow a stale copy of itself in the archive.

mod merge;
mod pending;
mod store;

pub use merge::{CompactionStats, MergeStats};
pub use pending::{PendingTier, Upsert};
pub use store::{LoadReport, SnapshotStore, StoreError};

use crate::catalog::CatalogItem;
use crate::normalizer::KnownIds;

/// In-memory catalog state for one run.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub archive: Vec<CatalogItem>,
    pub pending: PendingTier,
}

impl Snapshot {
    pub fn new(archive: Vec<CatalogItem>, pending: Vec<CatalogItem>) -> Self {
        Self {
            archive,
            pending: PendingTier::from_items(pending),
        }
    }

    /// True when neither tier holds anything (first run).
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty() && self.pending.is_empty()
    }

    /// Every id present in either tier.
    pub fn known_ids(&self) -> KnownIds {
        let mut known = KnownIds::new();
        known.extend(self.archive.iter().map(|item| item.id.as_str()));
        known.extend(self.pending.ids());
        known
    }
}
