//! Status snapshots — query every watch and persist the baseline.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::{info, warn};
use woof_core::StatusFile;

use crate::error::WatchResult;
use crate::registry::WatchRegistry;

/// Query every watch in registry order, one at a time.
///
/// Watches with an empty endpoint or that have never been seen are left
/// out. A watch that fails to answer in time keeps its entry from
/// `previous`, if it has one.
pub async fn collect_status(registry: &WatchRegistry, previous: &StatusFile) -> StatusFile {
    let mut snapshot = StatusFile::new();
    for watch in registry {
        let endpoint = watch.endpoint();
        if endpoint.is_empty() {
            continue;
        }
        match watch.query().await {
            Ok(status) if status.last_seen.is_some() => {
                snapshot.insert(endpoint.to_string(), status.to_persisted());
            }
            Ok(_) => {}
            Err(e) => match previous.get(endpoint) {
                Some(kept) => {
                    warn!(%endpoint, error = %e, "watch did not answer; keeping its previous entry");
                    snapshot.insert(endpoint.to_string(), kept.clone());
                }
                None => {
                    warn!(%endpoint, error = %e, "watch did not answer; leaving it out of the snapshot");
                }
            },
        }
    }
    snapshot
}

/// Writes status snapshots to one file, one write at a time.
///
/// The writer remembers the last snapshot it wrote (initially the status
/// file loaded at startup) as the fallback for unresponsive watches.
#[derive(Debug)]
pub struct SnapshotWriter {
    path: PathBuf,
    last_written: Mutex<StatusFile>,
}

impl SnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_baseline(path, StatusFile::new())
    }

    pub fn with_baseline(path: impl Into<PathBuf>, baseline: StatusFile) -> Self {
        Self {
            path: path.into(),
            last_written: Mutex::new(baseline),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Collect and write a snapshot, returning the number of entries.
    ///
    /// Overlapping calls queue behind each other, so the file always holds
    /// one complete snapshot.
    pub async fn write(&self, registry: &WatchRegistry) -> WatchResult<usize> {
        let mut last_written = self.last_written.lock().await;
        let snapshot = collect_status(registry, &last_written).await;
        woof_core::status::write_status(&self.path, &snapshot)?;
        info!(path = %self.path.display(), entries = snapshot.len(), "status snapshot written");
        let entries = snapshot.len();
        *last_written = snapshot;
        Ok(entries)
    }
}
