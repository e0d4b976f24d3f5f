//! Merging scan results into the snapshot, and folding pending into archive.

use std::collections::HashSet;
use std::ops::AddAssign;

use tracing::info;

use super::pending::Upsert;
use super::Snapshot;
use crate::catalog::CatalogItem;

/// Counts from merging scan results into the pending tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub replaced: usize,
    pub prepended: usize,
}

impl MergeStats {
    pub fn total(&self) -> usize {
        self.replaced + self.prepended
    }
}

impl AddAssign for MergeStats {
    fn add_assign(&mut self, other: MergeStats) {
        self.replaced += other.replaced;
        self.prepended += other.prepended;
    }
}

/// Counts from a compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionStats {
    /// Items moved from pending into the archive.
    pub moved: usize,
    /// Stale archive copies dropped because pending held a newer one.
    pub superseded: usize,
    pub archive_len: usize,
}

impl Snapshot {
    /// Merge items into the pending tier, in order. The archive is not touched.
    pub fn merge<I>(&mut self, items: I) -> MergeStats
    where
        I: IntoIterator<Item = CatalogItem>,
    {
        let mut stats = MergeStats::default();
        for item in items {
            match self.pending.upsert(item) {
                Upsert::Replaced => stats.replaced += 1,
                Upsert::Prepended => stats.prepended += 1,
            }
        }
        stats
    }

    /// Merge several endpoints' results, endpoint by endpoint.
    pub fn merge_all<I>(&mut self, results: I) -> MergeStats
    where
        I: IntoIterator<Item = Vec<CatalogItem>>,
    {
        let mut stats = MergeStats::default();
        for items in results {
            stats += self.merge(items);
        }
        stats
    }

    pub fn needs_compaction(&self, threshold: usize) -> bool {
        self.pending.len() > threshold
    }

    /// Fold the whole pending tier into the front of the archive.
    ///
    /// Archive copies of pending ids are dropped first, so the pending
    /// version wins and every id ends up in exactly one place.
    pub fn compact(&mut self) -> CompactionStats {
        let pending_ids: HashSet<&str> = self.pending.ids().collect();
        let before = self.archive.len();
        self.archive
            .retain(|item| !pending_ids.contains(item.id.as_str()));
        let superseded = before - self.archive.len();

        let mut archive = self.pending.drain();
        let moved = archive.len();
        archive.append(&mut self.archive);
        self.archive = archive;

        CompactionStats {
            moved,
            superseded,
            archive_len: self.archive.len(),
        }
    }

    /// Compact if the pending tier has grown past `threshold`.
    pub fn compact_if_needed(&mut self, threshold: usize) -> Option<CompactionStats> {
        if !self.needs_compaction(threshold) {
            return None;
        }
        info!(
            pending = self.pending.len(),
            threshold, "Pending tier over threshold, merging into archive"
        );
        Some(self.compact())
    }
}
