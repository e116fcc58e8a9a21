// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock object store with per-bucket failure injection.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use perch_core::{ObjectStore, PerchError};

/// One recorded upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub path: String,
    pub len: usize,
    pub content_type: String,
}

/// In-memory object store recording every successful put.
pub struct MockObjectStore {
    stored: Arc<Mutex<Vec<StoredObject>>>,
    failing_buckets: Arc<Mutex<HashSet<String>>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            stored: Arc::new(Mutex::new(Vec::new())),
            failing_buckets: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Make every put to `bucket` fail until cleared.
    pub async fn fail_bucket(&self, bucket: &str) {
        self.failing_buckets.lock().await.insert(bucket.to_string());
    }

    pub async fn clear_failures(&self) {
        self.failing_buckets.lock().await.clear();
    }

    /// Every object stored so far, in upload order.
    pub async fn stored(&self) -> Vec<StoredObject> {
        self.stored.lock().await.clone()
    }
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, PerchError> {
        if self.failing_buckets.lock().await.contains(bucket) {
            return Err(PerchError::Storage {
                message: format!("injected failure for bucket `{bucket}`"),
                source: None,
            });
        }

        self.stored.lock().await.push(StoredObject {
            bucket: bucket.to_string(),
            path: path.to_string(),
            len: bytes.len(),
            content_type: content_type.to_string(),
        });
        Ok(format!("https://cdn.test/{bucket}/{path}"))
    }
}
