use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::catalog::ItemType;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sync: SyncSettings,
    /// Categories to scan, in order. Compiled in, never read from a file.
    #[serde(skip, default = "default_endpoints")]
    pub endpoints: Vec<EndpointConfig>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            storage: StorageConfig::default(),
            sync: SyncSettings::default(),
            endpoints: default_endpoints(),
        }
    }
}

/// Remote content API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://cinemaplus-app.vercel.app".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

/// Snapshot file locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Encrypted cold tier.
    #[serde(default = "default_archive_path")]
    pub archive_path: PathBuf,
    /// Plain JSON hot tier.
    #[serde(default = "default_pending_path")]
    pub pending_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            archive_path: default_archive_path(),
            pending_path: default_pending_path(),
        }
    }
}

fn default_archive_path() -> PathBuf {
    PathBuf::from("archive.enc")
}

fn default_pending_path() -> PathBuf {
    PathBuf::from("updates.json")
}

/// Tuning for a single synchronization pass
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncSettings {
    /// Maximum simultaneous sub-resource requests (one enrichment batch).
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
    /// Pending tier size above which it is folded into the archive.
    #[serde(default = "default_compaction_threshold")]
    pub compaction_threshold: usize,
    /// Pages scanned per endpoint outside of bootstrap mode.
    #[serde(default = "default_incremental_page_budget")]
    pub incremental_page_budget: u32,
    #[serde(default)]
    pub mode: SyncMode,
    /// Prefix of every canonical item id.
    #[serde(default = "default_id_namespace")]
    pub id_namespace: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
            compaction_threshold: default_compaction_threshold(),
            incremental_page_budget: default_incremental_page_budget(),
            mode: SyncMode::default(),
            id_namespace: default_id_namespace(),
        }
    }
}

fn default_concurrency_limit() -> usize {
    15
}

fn default_compaction_threshold() -> usize {
    1000
}

fn default_incremental_page_budget() -> u32 {
    5
}

fn default_id_namespace() -> String {
    "plus".to_string()
}

/// How deep to scan each endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Bootstrap when the loaded snapshot is empty, incremental otherwise.
    #[default]
    Auto,
    Incremental,
    Bootstrap,
}

/// One remote category to scan.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Path relative to the API base URL, e.g. "/api/movies/new"
    pub path: String,
    pub item_type: ItemType,
    pub display_name: String,
    /// Page budget used in bootstrap mode only.
    pub max_page_budget: u32,
    /// Re-pull items even when their id is already known.
    #[serde(default)]
    pub force_refresh: bool,
}

impl EndpointConfig {
    pub fn new(path: &str, item_type: ItemType, display_name: &str) -> Self {
        Self {
            path: path.to_string(),
            item_type,
            display_name: display_name.to_string(),
            max_page_budget: DEFAULT_MAX_PAGE_BUDGET,
            force_refresh: false,
        }
    }

    pub fn with_force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }

    pub fn with_max_page_budget(mut self, max_page_budget: u32) -> Self {
        self.max_page_budget = max_page_budget;
        self
    }
}

const DEFAULT_MAX_PAGE_BUDGET: u32 = 1000;

/// The fixed list of categories synchronized on every run.
pub fn default_endpoints() -> Vec<EndpointConfig> {
    vec![
        EndpointConfig::new("/api/movies/new", ItemType::Movie, "New movies"),
        EndpointConfig::new("/api/movies/top-rated", ItemType::Movie, "Top rated movies"),
        EndpointConfig::new("/api/series/new", ItemType::Series, "New series"),
        // Known series gain episodes after first discovery
        EndpointConfig::new("/api/series/updated", ItemType::Series, "Updated series")
            .with_force_refresh(),
        EndpointConfig::new("/api/series/top-rated", ItemType::Series, "Top rated series"),
    ]
}
