pub mod catalog;
pub mod codec;
pub mod config;
pub mod engine;
pub mod enrich;
pub mod normalizer;
pub mod remote;
pub mod scanner;
pub mod snapshot;
pub mod testing;

pub use catalog::{CatalogItem, ItemType, RealId};
pub use codec::{CodecError, SnapshotCodec};
pub use config::{
    default_endpoints, load_config, load_config_from_str, validate_config, ConfigError,
    EndpointConfig, RemoteConfig, Secret, StorageConfig, SyncConfig, SyncMode, SyncSettings,
};
pub use engine::{EndpointReport, SyncEngine, SyncError, SyncReport};
pub use enrich::{Enricher, EnrichmentStats};
pub use normalizer::{Disposition, KnownIds, NormalizedItem, Normalizer};
pub use remote::{extract_items, HttpRemoteSource, RawItem, RemoteError, RemoteSource};
pub use scanner::{CategoryScanner, ScanMode, ScanOutcome, StopReason};
pub use snapshot::{
    CompactionStats, LoadReport, MergeStats, PendingTier, Snapshot, SnapshotStore, StoreError,
};
