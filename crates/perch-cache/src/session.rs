// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TTL-bound cache of the authenticated identity and profile summary.
//!
//! A pure performance/consistency optimization: every consumer must be able
//! to fall back to the identity/profile providers when this returns `None`.
//! Writes notify bus subscribers synchronously so independently-mounted
//! views converge without each re-fetching.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use perch_bus::{EventBus, Subscription};
use perch_core::{KeyValueStore, PerchError, SessionEntry, SessionSummary};

/// Bus topic for session summary updates.
pub const SESSION_TOPIC: &str = "session:updated";

const SESSION_KEY: &str = "session";
/// Caches derived from the session; cleared together on invalidation so a
/// stale identity never leaks into a new session on the same device.
const DEPENDENT_KEYS: &[&str] = &["profile", "role"];

/// Injectable time source, fixed in tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The session/profile cache shared across mounted views.
pub struct SessionCache<K> {
    kv: Arc<K>,
    bus: EventBus<SessionSummary>,
    ttl: Duration,
    clock: Clock,
}

impl<K: KeyValueStore> SessionCache<K> {
    pub fn new(kv: Arc<K>, bus: EventBus<SessionSummary>, ttl: Duration) -> Self {
        Self {
            kv,
            bus,
            ttl,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the time source. Test seam for TTL behavior.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Read the cached entry, or `None` when missing, expired, or corrupt.
    ///
    /// Decode failures degrade to a miss: a malformed persisted value must
    /// never crash the caller.
    pub async fn read(&self) -> Option<SessionEntry> {
        let raw = match self.kv.get(SESSION_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "session cache read failed, treating as miss");
                return None;
            }
        };

        let entry: SessionEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "session cache entry corrupt, treating as miss");
                return None;
            }
        };

        let age = (self.clock)() - entry.cached_at;
        if age >= self.ttl {
            debug!(age_secs = age.num_seconds(), "session cache entry expired");
            return None;
        }
        Some(entry)
    }

    /// Persist `entry` (stamped with the current time) and synchronously
    /// notify all subscribers with the `{role, display_name}` projection.
    pub async fn write(&self, mut entry: SessionEntry) -> Result<(), PerchError> {
        entry.cached_at = (self.clock)();
        let raw = serde_json::to_string(&entry)
            .map_err(|e| PerchError::Internal(format!("session entry serialization: {e}")))?;
        self.kv.set(SESSION_KEY, &raw).await?;

        self.bus.publish(SESSION_TOPIC, &SessionSummary::from(&entry));
        debug!(user_id = %entry.user_id.0, "session cache written");
        Ok(())
    }

    /// Drop the cached session and every dependent cache. Called on
    /// sign-out and on explicit role change.
    pub async fn invalidate(&self) -> Result<(), PerchError> {
        self.kv.remove(SESSION_KEY).await?;
        for key in DEPENDENT_KEYS {
            self.kv.remove(key).await?;
        }
        // Signed-out views converge on the empty projection.
        self.bus.publish(
            SESSION_TOPIC,
            &SessionSummary {
                role: None,
                display_name: None,
            },
        );
        debug!("session cache invalidated");
        Ok(())
    }

    /// Subscribe to summary updates. Delivery stops when the guard drops.
    pub fn subscribe(
        &self,
        handler: impl Fn(&SessionSummary) + Send + Sync + 'static,
    ) -> Subscription<SessionSummary> {
        self.bus.subscribe(SESSION_TOPIC, handler)
    }
}
