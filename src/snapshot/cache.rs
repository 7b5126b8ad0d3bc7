use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::OpenFlags;
use tokio::sync::Mutex;
use tokio_rusqlite::Connection;

use crate::db::SQLITE_HEADER;
use crate::error::{AppError, Result};

use super::source::SnapshotSource;

/// Locally cached copy of the remote article database.
///
/// A snapshot younger than the freshness window is served straight from disk.
/// Older (or missing) snapshots are re-downloaded by one request at a time; if
/// the download fails, whatever file is already on disk is served instead.
/// Requests that queued behind a download attempt share its outcome rather
/// than fetching again.
pub struct SnapshotCache {
    path: PathBuf,
    freshness: Duration,
    source: Arc<dyn SnapshotSource>,
    fetched_at: RwLock<Option<DateTime<Utc>>>,
    refresh_lock: Mutex<()>,
    /// Completed download attempts, successful or not.
    attempts: AtomicU64,
    last_failure: RwLock<Option<String>>,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>, freshness: Duration, source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            path: path.into(),
            freshness,
            source,
            fetched_at: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            attempts: AtomicU64::new(0),
            last_failure: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// When the snapshot was last downloaded by this process.
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        *self.fetched_at.read().unwrap_or_else(|e| e.into_inner())
    }

    pub async fn is_fresh(&self) -> bool {
        self.within_window() && self.file_exists().await
    }

    /// Open a read-only connection to a usable snapshot, refreshing it first if stale.
    pub async fn acquire(&self) -> Result<Connection> {
        if self.is_fresh().await {
            tracing::debug!("Serving cached snapshot {}", self.path.display());
            return open_read_only(&self.path).await;
        }

        let seen = self.attempts.load(Ordering::SeqCst);
        {
            let _guard = self.refresh_lock.lock().await;

            // Another request may have finished a refresh while we waited.
            if !self.is_fresh().await {
                if self.attempts.load(Ordering::SeqCst) != seen {
                    // The attempt we queued behind already ran; reuse its outcome.
                    if !self.file_exists().await {
                        return Err(AppError::SnapshotUnavailable(self.last_failure()));
                    }
                    tracing::debug!("Refresh attempt already ran, serving {}", self.path.display());
                } else {
                    match self.download().await {
                        Ok(_) => {}
                        Err(e) if is_fetch_failure(&e) => {
                            if !self.file_exists().await {
                                tracing::error!("Snapshot fetch failed with no cached copy: {}", e);
                                return Err(AppError::SnapshotUnavailable(e.to_string()));
                            }
                            tracing::warn!(
                                "Snapshot fetch failed, serving stale copy {}: {}",
                                self.path.display(),
                                e
                            );
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        open_read_only(&self.path).await
    }

    /// Download unconditionally, replacing the cached file. Returns the size in bytes.
    pub async fn refresh(&self) -> Result<u64> {
        let _guard = self.refresh_lock.lock().await;
        self.download().await
    }

    /// Caller must hold `refresh_lock`.
    async fn download(&self) -> Result<u64> {
        let outcome = self.fetch_and_store().await;
        *self.last_failure.write().unwrap_or_else(|e| e.into_inner()) =
            outcome.as_ref().err().map(|e| e.to_string());
        self.attempts.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    async fn fetch_and_store(&self) -> Result<u64> {
        tracing::info!("Fetching snapshot from {}", self.source.describe());
        let bytes = self.source.fetch().await?;
        if !bytes.starts_with(SQLITE_HEADER) {
            return Err(AppError::Upstream(
                "downloaded payload is not a SQLite database".to_string(),
            ));
        }

        let size = bytes.len() as u64;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(|e| anyhow::anyhow!("snapshot writer panicked: {e}"))??;

        // Published only after the rename, so "fresh" always means a complete file.
        *self.fetched_at.write().unwrap_or_else(|e| e.into_inner()) = Some(Utc::now());
        tracing::info!("Stored {} byte snapshot at {}", size, self.path.display());
        Ok(size)
    }

    fn last_failure(&self) -> String {
        self.last_failure
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_else(|| "snapshot refresh failed".to_string())
    }

    fn within_window(&self) -> bool {
        let Some(fetched_at) = self.fetched_at() else {
            return false;
        };
        let age = Utc::now().signed_duration_since(fetched_at);
        match chrono::Duration::from_std(self.freshness) {
            Ok(window) => age < window,
            Err(_) => true,
        }
    }

    async fn file_exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}

/// Errors reaching or validating upstream; a stale file may stand in for these.
/// Local write failures are not in this set.
fn is_fetch_failure(err: &AppError) -> bool {
    matches!(err, AppError::Http(_) | AppError::Upstream(_))
}

async fn open_read_only(path: &Path) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .await?;
    Ok(conn)
}

/// Write to a temp file beside `path`, then rename it into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".snapshot-")
        .suffix(".tmp")
        .tempfile_in(&parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
