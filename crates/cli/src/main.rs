use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_sync_core::{
    load_config, validate_config, HttpRemoteSource, RemoteSource, Secret, SnapshotCodec,
    SnapshotStore, SyncEngine,
};

/// Environment variable naming the config file.
const CONFIG_ENV_VAR: &str = "CATSYNC_CONFIG";

/// Config file picked up from the working directory when present.
const DEFAULT_CONFIG_FILE: &str = "catsync.toml";

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn config_path() -> Option<PathBuf> {
    match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) => Some(PathBuf::from(path)),
        Err(_) => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    }
}

async fn run() -> Result<()> {
    // The secret is checked before anything touches the network or disk
    let secret = Secret::from_env()?;

    let config_path = config_path();
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Remote: {}", config.remote.base_url);
    info!("Archive path: {:?}", config.storage.archive_path);
    info!("Pending path: {:?}", config.storage.pending_path);

    let remote: Arc<dyn RemoteSource> = Arc::new(
        HttpRemoteSource::new(&config.remote).context("Failed to create HTTP client")?,
    );
    let store = SnapshotStore::new(&config.storage, SnapshotCodec::new(&secret));
    let engine = SyncEngine::new(config, remote, store);

    let report = engine.run().await.context("Sync failed")?;

    info!(
        mode = ?report.mode,
        saved = report.saved,
        elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
        "Processed {} items",
        report.processed
    );
    if let Some(compaction) = report.compaction {
        info!(
            moved = compaction.moved,
            archive = compaction.archive_len,
            "Pending tier merged into archive"
        );
    }

    Ok(())
}
