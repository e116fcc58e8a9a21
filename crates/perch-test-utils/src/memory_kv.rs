// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory key-value store with read failure injection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use perch_core::{KeyValueStore, PerchError};

/// HashMap-backed key-value store for tests.
pub struct MemoryKv {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Make subsequent reads fail, exercising degrade-to-absent paths.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

impl Default for MemoryKv {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, PerchError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PerchError::Storage {
                message: "injected kv read failure".into(),
                source: None,
            });
        }
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PerchError> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PerchError> {
        self.values.lock().await.remove(key);
        Ok(())
    }
}
