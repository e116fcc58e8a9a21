// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./perch.toml` > `~/.config/perch/perch.toml`
//! with environment variable overrides via `PERCH_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PerchConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `~/.config/perch/perch.toml` (user XDG config)
/// 3. `./perch.toml` (local directory)
/// 4. `PERCH_*` environment variables
pub fn load_config() -> Result<PerchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PerchConfig::default()))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("perch/perch.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("perch.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<PerchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PerchConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PerchConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PerchConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `PERCH_LIMITS_MAX_FILE_BYTES` must map
/// to `limits.max_file_bytes`, not `limits.max.file.bytes`.
fn env_provider() -> Env {
    Env::prefixed("PERCH_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: PERCH_STORAGE_PRIMARY_BUCKET -> "storage_primary_bucket"
        let mapped = key
            .as_str()
            .replacen("api_", "api.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("limits_", "limits.", 1)
            .replacen("session_", "session.", 1);
        mapped.into()
    })
}
