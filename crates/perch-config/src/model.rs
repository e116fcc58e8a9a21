// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Perch messaging client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at load time.

use serde::{Deserialize, Serialize};

/// Top-level Perch configuration.
///
/// Loaded from TOML files with environment variable overrides. All sections
/// are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PerchConfig {
    /// Marketplace REST/websocket endpoints.
    #[serde(default)]
    pub api: ApiConfig,

    /// Object storage buckets for attachments.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Attachment and history limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Session cache settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Marketplace endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the marketplace REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// URL of the push channel websocket endpoint.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: default_ws_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_ws_url() -> String {
    "ws://localhost:8000/realtime".to_string()
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Bucket tried first for every upload.
    #[serde(default = "default_primary_bucket")]
    pub primary_bucket: String,

    /// Bucket tried when the primary rejects an upload.
    #[serde(default = "default_fallback_bucket")]
    pub fallback_bucket: String,

    /// Leading path segment for attachment objects.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            primary_bucket: default_primary_bucket(),
            fallback_bucket: default_fallback_bucket(),
            namespace: default_namespace(),
        }
    }
}

fn default_primary_bucket() -> String {
    "attachments".to_string()
}

fn default_fallback_bucket() -> String {
    "public".to_string()
}

fn default_namespace() -> String {
    "messages".to_string()
}

/// Attachment and history limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Per-file upload ceiling in bytes.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Maximum attachments in flight for one outgoing message.
    #[serde(default = "default_max_attachments")]
    pub max_attachments: usize,

    /// History bound for a direct thread view.
    #[serde(default = "default_direct_history_limit")]
    pub direct_history_limit: usize,

    /// History bound for a listing-scoped thread view.
    #[serde(default = "default_listing_history_limit")]
    pub listing_history_limit: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            max_attachments: default_max_attachments(),
            direct_history_limit: default_direct_history_limit(),
            listing_history_limit: default_listing_history_limit(),
        }
    }
}

fn default_max_file_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_max_attachments() -> usize {
    10
}

fn default_direct_history_limit() -> usize {
    200
}

fn default_listing_history_limit() -> usize {
    50
}

/// Session cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Seconds a cached session entry stays valid.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    600
}
