//! File-backed snapshot storage.
//!
//! The archive lives in an encrypted blob, the pending tier in plain JSON.
//! Both are read once at startup and written together at most once per run.
//! A file that cannot be decoded is moved aside to `<name>.corrupt-<ts>` and
//! its tier starts empty, so the following save cannot overwrite it.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::Snapshot;
use crate::catalog::CatalogItem;
use crate::codec::{CodecError, SnapshotCodec};
use crate::config::StorageConfig;

/// Errors that can occur while loading or saving a snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode archive: {0}")]
    Encode(#[from] CodecError),

    #[error("Failed to serialize pending tier: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What happened while loading a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Where unreadable files were moved.
    pub quarantined: Vec<PathBuf>,
}

impl LoadReport {
    /// True when every file present was read successfully.
    pub fn is_clean(&self) -> bool {
        self.quarantined.is_empty()
    }
}

/// Reads and writes the archive/pending file pair.
pub struct SnapshotStore {
    archive_path: PathBuf,
    pending_path: PathBuf,
    codec: SnapshotCodec,
}

impl SnapshotStore {
    pub fn new(config: &StorageConfig, codec: SnapshotCodec) -> Self {
        Self {
            archive_path: config.archive_path.clone(),
            pending_path: config.pending_path.clone(),
            codec,
        }
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn pending_path(&self) -> &Path {
        &self.pending_path
    }

    /// Load both tiers. Missing files are empty tiers.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        self.load_with_report().map(|(snapshot, _)| snapshot)
    }

    /// Load both tiers and report which files had to be moved aside.
    pub fn load_with_report(&self) -> Result<(Snapshot, LoadReport), StoreError> {
        let mut report = LoadReport::default();

        let archive = load_tier(&self.archive_path, "archive", &mut report, |text| {
            self.codec
                .try_decode::<Vec<CatalogItem>>(text)
                .map_err(|e| e.to_string())
        })?;
        let pending = load_tier(&self.pending_path, "pending", &mut report, |text| {
            serde_json::from_str::<Vec<CatalogItem>>(text).map_err(|e| e.to_string())
        })?;

        info!(
            archive = archive.len(),
            pending = pending.len(),
            quarantined = report.quarantined.len(),
            "Snapshot loaded"
        );

        Ok((Snapshot::new(archive, pending), report))
    }

    /// Write both tiers. Both payloads are encoded before either file is
    /// touched, and each file is replaced via rename.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let archive_blob = self.codec.encode(&snapshot.archive)?;
        let pending: Vec<&CatalogItem> = snapshot.pending.iter().collect();
        let pending_json = serde_json::to_string(&pending)?;

        write_replace(&self.archive_path, archive_blob.as_bytes())?;
        write_replace(&self.pending_path, pending_json.as_bytes())?;

        info!(
            archive = snapshot.archive.len(),
            pending = snapshot.pending.len(),
            "Snapshot saved"
        );
        Ok(())
    }
}

/// Read one tier. Only I/O failures are errors: content that is not UTF-8
/// or fails `parse` is quarantined and the tier starts empty.
fn load_tier<F>(
    path: &Path,
    tier: &str,
    report: &mut LoadReport,
    parse: F,
) -> Result<Vec<CatalogItem>, StoreError>
where
    F: FnOnce(&str) -> Result<Vec<CatalogItem>, String>,
{
    let Some(bytes) = read_optional(path)? else {
        debug!(path = %path.display(), tier, "No file yet");
        return Ok(Vec::new());
    };

    let parsed = String::from_utf8(bytes)
        .map_err(|e| e.to_string())
        .and_then(|text| parse(&text));

    match parsed {
        Ok(items) => Ok(items),
        Err(reason) => {
            warn!(path = %path.display(), tier, error = %reason, "Unreadable file, starting with an empty tier");
            report.quarantined.push(quarantine(path)?);
            Ok(Vec::new())
        }
    }
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

fn quarantine(path: &Path) -> Result<PathBuf, StoreError> {
    let target = sibling(
        path,
        &format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")),
    );
    fs::rename(path, &target).map_err(|e| StoreError::io(path, e))?;
    warn!(from = %path.display(), to = %target.display(), "Moved unreadable file aside");
    Ok(target)
}

fn write_replace(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let tmp = sibling(path, ".tmp");
    let result = fs::write(&tmp, contents)
        .map_err(|e| StoreError::io(&tmp, e))
        .and_then(|()| fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e)));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
