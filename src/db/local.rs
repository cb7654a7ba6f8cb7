// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local snapshot slot backed by a JSON file.
//!
//! Holds the last-known-good snapshot. It is overwritten after every mutation
//! and read back when the remote store has nothing usable.

use crate::models::Snapshot;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Durable single-slot snapshot store.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw stored record, `None` if the slot is empty.
    ///
    /// The content is returned unvalidated; it goes through the same ingest
    /// pipeline as remote data.
    pub async fn read(&self) -> Result<Option<Value>, LocalStoreError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LocalStoreError::Io(e.to_string())),
        };

        serde_json::from_str(&data)
            .map(Some)
            .map_err(|e| LocalStoreError::Corrupt(e.to_string()))
    }

    /// Overwrite the slot with a snapshot.
    ///
    /// Written to a sibling temp file and renamed into place so a crash never
    /// leaves a half-written slot.
    pub async fn write(&self, snapshot: &Snapshot) -> Result<(), LocalStoreError> {
        let data = serde_json::to_vec(snapshot)
            .map_err(|e| LocalStoreError::Io(format!("Failed to encode snapshot: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LocalStoreError::Io(e.to_string()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &data)
            .await
            .map_err(|e| LocalStoreError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| LocalStoreError::Io(e.to_string()))?;

        tracing::debug!(path = %self.path.display(), bytes = data.len(), "Saved local snapshot");
        Ok(())
    }

    /// Empty the slot. Clearing an empty slot is not an error.
    pub async fn clear(&self) -> Result<(), LocalStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LocalStoreError::Io(e.to_string())),
        }
    }
}

/// Errors from the local slot.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LocalStoreError {
    #[error("Local store I/O error: {0}")]
    Io(String),

    #[error("Local snapshot is corrupted: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RouteEntry;

    #[tokio::test]
    async fn test_write_read_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path().join("nested/state.json"));

        assert!(store.read().await.unwrap().is_none());

        let mut entry = RouteEntry::default();
        entry
            .users
            .insert("Alice".to_string(), Some("2025-12-10".to_string()));
        let snapshot = Snapshot {
            routes: vec![entry],
        };
        store.write(&snapshot).await.unwrap();

        let stored = store.read().await.unwrap().unwrap();
        assert_eq!(stored, snapshot.to_value());

        store.clear().await.unwrap();
        assert!(store.read().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let err = LocalStore::new(&path).read().await.unwrap_err();
        assert!(matches!(err, LocalStoreError::Corrupt(_)));
    }
}
