//! Key-value storage for snapshot documents.
//!
//! Each feed owns one document identified by its file name (`wiki.json`,
//! `trends_google.json`, ...). The refresh job is the only writer.

use crate::errors::StoreError;
use crate::models::Snapshot;
use crate::utils::ensure_writable_dir;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Storage for snapshot documents, keyed by file name.
pub trait SnapshotStore {
    /// Read and decode the document stored under `name`.
    ///
    /// Returns `Ok(None)` when nothing is stored yet. A document that exists
    /// but does not decode is an error, so callers can decide what to do with it.
    async fn load(&self, name: &str) -> Result<Option<Snapshot>, StoreError>;

    /// Replace the document stored under `name`.
    ///
    /// The whole document is serialized before anything is written, and the
    /// replacement is atomic for readers.
    async fn save<T: Serialize + Sync>(&self, name: &str, doc: &T) -> Result<(), StoreError>;
}

/// Pretty-printed JSON files in a single directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the output directory if needed and check that it is writable.
    pub async fn ensure_ready(&self) -> Result<(), StoreError> {
        ensure_writable_dir(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl SnapshotStore for FsStore {
    #[instrument(level = "debug", skip(self))]
    async fn load(&self, name: &str) -> Result<Option<Snapshot>, StoreError> {
        let path = self.path_of(name);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No existing snapshot");
                return Ok(None);
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    #[instrument(level = "info", skip(self, doc))]
    async fn save<T: Serialize + Sync>(&self, name: &str, doc: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(doc)?;
        let path = self.path_of(name);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, json.as_bytes())
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        if let Err(source) = fs::rename(&tmp, &path).await {
            if let Err(e) = fs::remove_file(&tmp).await {
                warn!(path = %tmp.display(), error = %e, "Could not remove temp file");
            }
            return Err(StoreError::Io { path, source });
        }

        info!(path = %path.display(), bytes = json.len(), "Wrote snapshot");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeedBatch, FeedTags, RankedItem};
    use chrono::{TimeZone, Utc};

    fn sample() -> Snapshot {
        Snapshot::success(
            FeedTags::new("hacker_news"),
            FeedBatch {
                date: "2025-05-06".to_string(),
                items: vec![
                    RankedItem::new(1, "Show HN", "https://example.com").with_points(10),
                ],
            },
            Utc.with_ymd_and_hms(2025, 5, 6, 8, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_fs_store_round_trip_and_pretty_output() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().join("data"));
        store.ensure_ready().await.unwrap();

        assert!(store.load("hn.json").await.unwrap().is_none());

        store.save("hn.json", &sample()).await.unwrap();
        let loaded = store.load("hn.json").await.unwrap().unwrap();
        assert_eq!(loaded, sample());

        let written = dir.path().join("data/hn.json");
        let text = std::fs::read_to_string(written).unwrap();
        assert!(text.contains("\n  \"ok\": true"));
        assert!(!dir.path().join("data/hn.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_fs_store_corrupt_document_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wiki.json");
        std::fs::write(path, "{ not json").unwrap();
        let store = FsStore::new(dir.path());

        let err = store.load("wiki.json").await.unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }

    #[tokio::test]
    async fn test_fs_store_save_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path().join("missing"));

        let err = store.save("apps.json", &sample()).await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[tokio::test]
    async fn test_fs_store_failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // a non-empty directory in the way makes the rename fail
        let blocker = dir.path().join("trends_google.json/keep");
        std::fs::create_dir_all(blocker).unwrap();
        let store = FsStore::new(dir.path());

        let err = store
            .save("trends_google.json", &sample())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!dir.path().join("trends_google.json.tmp").exists());
        assert!(dir.path().join("trends_google.json/keep").is_dir());
    }
}
