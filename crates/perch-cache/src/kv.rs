// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed implementation of the [`KeyValueStore`] trait.
//!
//! One file per key under a root directory, written via a temp file and
//! rename so a crash mid-write never leaves a torn value behind.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use perch_core::{KeyValueStore, PerchError};

/// Durable key-value store keeping each value in its own file.
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store under the platform data directory
    /// (`<data_dir>/perch/cache`).
    pub fn in_data_dir() -> Result<Self, PerchError> {
        let base = dirs::data_dir()
            .ok_or_else(|| PerchError::Config("no platform data directory available".into()))?;
        Ok(Self::new(base.join("perch/cache")))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are short identifiers; anything path-hostile maps to '-'.
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        self.root.join(format!("{safe}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PerchError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PerchError::storage(format!("kv read failed for `{key}`"), e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PerchError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| PerchError::storage("kv root creation failed", e))?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| PerchError::storage(format!("kv write failed for `{key}`"), e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| PerchError::storage(format!("kv rename failed for `{key}`"), e))?;
        debug!(key, "kv value written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PerchError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PerchError::storage(format!("kv remove failed for `{key}`"), e)),
        }
    }
}
