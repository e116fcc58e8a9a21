// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-local persistent key-value store trait.

use async_trait::async_trait;

use crate::error::PerchError;

/// Best-effort durable key-value storage on the client device.
///
/// Backs the session cache and the saved-listings list. Callers must
/// degrade gracefully: a read failure is treated as absent, never
/// propagated as a hard error to the UI.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value for `key`, `None` when missing.
    async fn get(&self, key: &str) -> Result<Option<String>, PerchError>;

    /// Durably write `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), PerchError>;

    /// Remove `key` if present.
    async fn remove(&self, key: &str) -> Result<(), PerchError>;
}
