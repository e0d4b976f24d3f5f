//! Sync lifecycle integration tests.
//!
//! These tests drive complete runs through the engine against a mock remote
//! and real files: load -> scan -> merge -> compact -> save.

use std::fs;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use catalog_sync_core::{
    testing::{fixtures, MockRemoteSource},
    CatalogItem, EndpointConfig, ItemType, ScanMode, Secret, Snapshot, SnapshotCodec,
    SnapshotStore, StopReason, StorageConfig, SyncConfig, SyncEngine, SyncMode,
};

const MOVIES: &str = "/api/movies/new";
const UPDATED_SERIES: &str = "/api/series/updated";

/// Test helper wiring a mock remote and a temp directory to an engine.
struct TestHarness {
    remote: Arc<MockRemoteSource>,
    config: SyncConfig,
    codec: SnapshotCodec,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new(endpoints: Vec<EndpointConfig>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = SyncConfig::default();
        config.storage = StorageConfig {
            archive_path: temp_dir.path().join("archive.enc"),
            pending_path: temp_dir.path().join("updates.json"),
        };
        config.endpoints = endpoints;

        Self {
            remote: Arc::new(MockRemoteSource::new()),
            config,
            codec: SnapshotCodec::new(&Secret::new("lifecycle-secret").unwrap()),
            temp_dir,
        }
    }

    fn store(&self) -> SnapshotStore {
        SnapshotStore::new(&self.config.storage, self.codec.clone())
    }

    fn engine(&self) -> SyncEngine {
        SyncEngine::new(self.config.clone(), self.remote.clone(), self.store())
    }

    fn seed(&self, archive: Vec<CatalogItem>, pending: Vec<CatalogItem>) {
        self.store()
            .save(&Snapshot::new(archive, pending))
            .expect("Failed to seed snapshot");
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.temp_dir.path().join(name)).unwrap()
    }
}

fn movies() -> EndpointConfig {
    EndpointConfig::new(MOVIES, ItemType::Movie, "New movies")
}

#[tokio::test]
async fn test_first_pass_then_idle_rerun() {
    let harness = TestHarness::new(vec![movies()]);
    harness
        .remote
        .set_pages(
            MOVIES,
            vec![vec![
                fixtures::raw_item(1, "A"),
                fixtures::raw_item(2, "B"),
                fixtures::raw_item(3, "C"),
            ]],
        )
        .await;

    let report = harness.engine().run().await.unwrap();

    assert_eq!(report.mode, ScanMode::Bootstrap);
    assert_eq!(report.processed, 3);
    assert!(report.saved);
    assert!(report.compaction.is_none());
    assert_eq!(report.endpoints[0].stop_reason, StopReason::Exhausted);
    assert_eq!(harness.remote.pages_requested(MOVIES).await, vec![0, 1]);

    let snapshot = harness.store().load().unwrap();
    assert!(snapshot.archive.is_empty());
    let ids: Vec<_> = snapshot.pending.ids().collect();
    assert_eq!(ids, vec!["plus_3", "plus_2", "plus_1"]);

    let pending_before = harness.read("updates.json");
    let archive_before = harness.read("archive.enc");

    // Same pages again: everything is known, so nothing changes on disk
    harness.remote.clear_recorded().await;
    let rerun = harness.engine().run().await.unwrap();

    assert_eq!(rerun.mode, ScanMode::Incremental);
    assert_eq!(rerun.processed, 0);
    assert!(!rerun.saved);
    assert_eq!(rerun.endpoints[0].stop_reason, StopReason::AllDuplicates);
    assert_eq!(harness.remote.pages_requested(MOVIES).await, vec![0]);
    assert_eq!(harness.read("updates.json"), pending_before);
    assert_eq!(harness.read("archive.enc"), archive_before);
}

#[tokio::test]
async fn test_incremental_pass_prepends_only_new_items() {
    let harness = TestHarness::new(vec![movies()]);
    harness.seed(
        vec![fixtures::movie("1", "A")],
        vec![fixtures::movie("2", "B")],
    );
    harness
        .remote
        .set_pages(
            MOVIES,
            vec![vec![
                fixtures::raw_item(4, "D"),
                fixtures::raw_item(2, "B"),
                fixtures::raw_item(1, "A"),
            ]],
        )
        .await;

    let report = harness.engine().run().await.unwrap();

    assert_eq!(report.mode, ScanMode::Incremental);
    assert_eq!(report.processed, 1);

    let snapshot = harness.store().load().unwrap();
    let ids: Vec<_> = snapshot.pending.ids().collect();
    assert_eq!(ids, vec!["plus_4", "plus_2"]);
    assert_eq!(snapshot.archive.len(), 1);
}

#[tokio::test]
async fn test_forced_refresh_replaces_in_place() {
    let updated =
        EndpointConfig::new(UPDATED_SERIES, ItemType::Series, "Updated series").with_force_refresh();
    let harness = TestHarness::new(vec![updated]);
    harness.seed(
        vec![],
        vec![
            fixtures::movie("9", "Other"),
            fixtures::series_with_seasons("5", "Old title", json!([{"season": 1}])),
        ],
    );
    harness
        .remote
        .set_pages(UPDATED_SERIES, vec![vec![fixtures::raw_item(5, "New title")]])
        .await;
    harness
        .remote
        .set_seasons("5", json!([{"season": 1}, {"season": 2}]))
        .await;

    let report = harness.engine().run().await.unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.endpoints[0].refreshed_items, 1);
    assert_eq!(report.merge.replaced, 1);

    let snapshot = harness.store().load().unwrap();
    let ids: Vec<_> = snapshot.pending.ids().collect();
    assert_eq!(ids, vec!["plus_9", "plus_5"]);
    let refreshed = snapshot.pending.get("plus_5").unwrap();
    assert_eq!(refreshed.title.as_deref(), Some("New title"));
    assert_eq!(refreshed.seasons, Some(json!([{"season": 1}, {"season": 2}])));
}

#[tokio::test]
async fn test_compaction_when_pending_overflows() {
    let mut harness = TestHarness::new(vec![movies()]);
    harness.config.sync.mode = SyncMode::Incremental;
    harness.config.sync.compaction_threshold = 3;
    harness.seed(
        vec![fixtures::movie("1", "archived"), fixtures::movie("100", "archived")],
        vec![fixtures::movie("2", "B"), fixtures::movie("3", "C")],
    );
    harness
        .remote
        .set_pages(
            MOVIES,
            vec![vec![fixtures::raw_item(10, "J"), fixtures::raw_item(11, "K")]],
        )
        .await;

    let report = harness.engine().run().await.unwrap();

    assert_eq!(report.processed, 2);
    let compaction = report.compaction.expect("Expected compaction");
    assert_eq!(compaction.moved, 4);
    assert_eq!(compaction.archive_len, 6);

    let snapshot = harness.store().load().unwrap();
    assert!(snapshot.pending.is_empty());
    let ids: Vec<_> = snapshot.archive.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["plus_11", "plus_10", "plus_2", "plus_3", "plus_1", "plus_100"]
    );
    assert_eq!(harness.read("updates.json"), "[]");
}

#[tokio::test]
async fn test_failed_page_keeps_earlier_results() {
    let mut harness = TestHarness::new(vec![movies()]);
    harness.config.sync.mode = SyncMode::Bootstrap;
    harness
        .remote
        .set_pages(
            MOVIES,
            vec![
                vec![fixtures::raw_item(1, "A")],
                vec![fixtures::raw_item(2, "B")],
            ],
        )
        .await;
    harness.remote.fail_page(MOVIES, 1).await;

    let report = harness.engine().run().await.unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.endpoints[0].stop_reason, StopReason::FetchFailed);
    assert!(report.saved);
    let snapshot = harness.store().load().unwrap();
    assert!(snapshot.pending.contains("plus_1"));
    assert!(!snapshot.pending.contains("plus_2"));
}

#[tokio::test]
async fn test_failing_endpoint_leaves_the_next_one_alone() {
    let harness = TestHarness::new(vec![
        movies(),
        EndpointConfig::new(UPDATED_SERIES, ItemType::Series, "Updated series"),
    ]);
    harness.remote.fail_page(MOVIES, 0).await;
    harness
        .remote
        .set_pages(
            UPDATED_SERIES,
            vec![vec![fixtures::raw_item(20, "S1"), fixtures::raw_item(21, "S2")]],
        )
        .await;
    harness.remote.set_seasons("20", json!([{"season": 1}])).await;

    let report = harness.engine().run().await.unwrap();

    assert_eq!(report.endpoints.len(), 2);
    assert_eq!(report.endpoints[0].stop_reason, StopReason::FetchFailed);
    assert_eq!(report.endpoints[0].pages_fetched, 0);
    assert_eq!(report.endpoints[1].stop_reason, StopReason::Exhausted);
    assert_eq!(report.endpoints[1].new_items, 2);
    assert_eq!(report.processed, 2);
    assert!(report.saved);
    assert_eq!(harness.remote.pages_requested(UPDATED_SERIES).await, vec![0, 1]);

    let snapshot = harness.store().load().unwrap();
    let ids: Vec<_> = snapshot.pending.ids().collect();
    assert_eq!(ids, vec!["plus_21", "plus_20"]);
    assert_eq!(
        snapshot.pending.get("plus_20").unwrap().seasons,
        Some(json!([{"season": 1}]))
    );
}

#[tokio::test]
async fn test_corrupt_archive_is_kept_aside() {
    let harness = TestHarness::new(vec![movies()]);
    fs::write(harness.temp_dir.path().join("archive.enc"), "not-a-blob").unwrap();
    harness
        .remote
        .set_pages(MOVIES, vec![vec![fixtures::raw_item(1, "A")]])
        .await;

    let report = harness.engine().run().await.unwrap();

    // Recovery from a bad file is not a first run
    assert_eq!(report.mode, ScanMode::Incremental);
    assert!(report.saved);
    let quarantined: Vec<_> = fs::read_dir(harness.temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("archive.enc.corrupt-"))
        .collect();
    assert_eq!(quarantined.len(), 1);
    assert_eq!(
        fs::read_to_string(harness.temp_dir.path().join(&quarantined[0])).unwrap(),
        "not-a-blob"
    );
    // A fresh archive was written next to it
    assert!(harness.store().load().unwrap().archive.is_empty());
}
