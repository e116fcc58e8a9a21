// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as URL schemes, non-empty bucket names, and positive
//! limits.

use thiserror::Error;

use crate::model::PerchConfig;

/// A configuration error surfaced at load time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The underlying TOML/env extraction failed.
    #[error("{0}")]
    Extraction(#[from] Box<figment::Error>),

    /// A semantic constraint was violated.
    #[error("{message}")]
    Validation { message: String },
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PerchConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let base_url = config.api.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("api.base_url `{base_url}` must be an http(s) URL"),
        });
    }

    let ws_url = config.api.ws_url.trim();
    if !ws_url.starts_with("ws://") && !ws_url.starts_with("wss://") {
        errors.push(ConfigError::Validation {
            message: format!("api.ws_url `{ws_url}` must be a ws(s) URL"),
        });
    }

    if config.storage.primary_bucket.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.primary_bucket must not be empty".to_string(),
        });
    }

    if config.storage.fallback_bucket.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.fallback_bucket must not be empty".to_string(),
        });
    }

    if config.storage.primary_bucket == config.storage.fallback_bucket {
        errors.push(ConfigError::Validation {
            message: format!(
                "storage.primary_bucket and storage.fallback_bucket must differ, both are `{}`",
                config.storage.primary_bucket
            ),
        });
    }

    if config.limits.max_file_bytes == 0 {
        errors.push(ConfigError::Validation {
            message: "limits.max_file_bytes must be positive".to_string(),
        });
    }

    if config.limits.max_attachments == 0 {
        errors.push(ConfigError::Validation {
            message: "limits.max_attachments must be positive".to_string(),
        });
    }

    if config.limits.direct_history_limit == 0 || config.limits.listing_history_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "history limits must be positive".to_string(),
        });
    }

    if config.session.cache_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "session.cache_ttl_secs must be positive".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
