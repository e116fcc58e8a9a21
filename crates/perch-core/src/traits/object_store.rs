// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object storage trait for attachment uploads.

use async_trait::async_trait;

use crate::error::PerchError;

/// Two logical buckets ("attachments" primary, "public" fallback) addressed
/// by `<namespace>/<owner>/<timestamp>_<random>.<ext>` paths.
///
/// Uploaded objects are immutable; a retry after failure writes a fresh
/// path rather than overwriting.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `bytes` to `bucket` at `path` and return a publicly
    /// resolvable URL.
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, PerchError>;
}
