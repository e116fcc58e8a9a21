// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Perch messaging client.

use thiserror::Error;

/// The primary error type used across all Perch adapter traits and core operations.
///
/// Every failure in this subsystem surfaces as a value of this type; nothing
/// here is fatal to the host application.
#[derive(Debug, Error)]
pub enum PerchError {
    /// Configuration errors (invalid TOML, missing required fields, bad limits).
    #[error("configuration error: {0}")]
    Config(String),

    /// The bearer credential was rejected or missing. Never retried internally;
    /// token refresh belongs to the identity provider.
    #[error("authorization error: {0}")]
    Auth(String),

    /// Network-level failure on fetch, send, upload, or the push transport.
    /// Retryable by the user re-triggering the action.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote message table or object store rejected an operation.
    #[error("storage error: {message}")]
    Storage {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Both the primary and the fallback bucket rejected an upload. The
    /// primary error is preserved rather than swallowed by the fallback.
    #[error("upload failed: primary bucket: {primary}; fallback bucket: {fallback}")]
    UploadFailed { primary: String, fallback: String },

    /// A send was attempted while a previous send for the same conversation
    /// is still outstanding.
    #[error("a send is already in flight for this conversation")]
    SendInFlight,

    /// The draft carries neither text nor attachments.
    #[error("nothing to send: draft has no text or attachments")]
    EmptyDraft,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PerchError {
    /// Wrap a network-layer error with context.
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PerchError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wrap a storage-layer error with context.
    pub fn storage(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PerchError::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for failures the user can resolve by re-triggering the action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PerchError::Transport { .. } | PerchError::Storage { .. })
    }
}
