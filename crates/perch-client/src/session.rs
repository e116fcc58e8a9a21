// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sign-in state for the messaging surface.
//!
//! Reads go through the TTL cache first; a miss falls back to the identity
//! and profile providers and re-primes the cache. The cache is strictly an
//! optimization: a failed cache write degrades to a warn, never to a
//! failed lookup.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use perch_cache::SessionCache;
use perch_core::{
    IdentityProvider, KeyValueStore, PerchError, ProfileStore, SessionEntry,
};

/// Resolves the signed-in identity for message rendering and sends.
pub struct SessionManager<K, I, P> {
    cache: SessionCache<K>,
    identity: Arc<I>,
    profiles: Arc<P>,
}

impl<K, I, P> SessionManager<K, I, P>
where
    K: KeyValueStore,
    I: IdentityProvider,
    P: ProfileStore,
{
    pub fn new(cache: SessionCache<K>, identity: Arc<I>, profiles: Arc<P>) -> Self {
        Self {
            cache,
            identity,
            profiles,
        }
    }

    /// The current session entry: cached when fresh, otherwise fetched
    /// from the providers and written back.
    pub async fn current(&self) -> Result<SessionEntry, PerchError> {
        if let Some(entry) = self.cache.read().await {
            return Ok(entry);
        }

        let credentials = self.identity.credentials().await?;
        let profile = self.profiles.profile(&credentials.user_id).await?;

        let entry = SessionEntry {
            user_id: credentials.user_id,
            role: profile.as_ref().and_then(|p| p.role),
            display_name: profile.as_ref().map(|p| p.display_name.clone()),
            avatar_url: profile.and_then(|p| p.avatar_url),
            cached_at: Utc::now(),
        };

        if let Err(e) = self.cache.write(entry.clone()).await {
            warn!(error = %e, "session cache write failed, continuing uncached");
        }
        Ok(entry)
    }

    /// Sign out: drop the cached session and its dependent caches.
    pub async fn sign_out(&self) -> Result<(), PerchError> {
        self.cache.invalidate().await
    }

    pub fn cache(&self) -> &SessionCache<K> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use perch_bus::EventBus;
    use perch_core::{ProfileSummary, Role, UserId};
    use perch_test_utils::{MemoryKv, MockProfiles, StaticIdentity};

    async fn manager() -> SessionManager<MemoryKv, StaticIdentity, MockProfiles> {
        let profiles = MockProfiles::new();
        profiles
            .register(ProfileSummary {
                id: UserId("alice".into()),
                display_name: "Alice".into(),
                avatar_url: None,
                role: Some(Role::Seeker),
            })
            .await;

        SessionManager::new(
            SessionCache::new(
                Arc::new(MemoryKv::new()),
                EventBus::new(),
                Duration::minutes(10),
            ),
            Arc::new(StaticIdentity::new("alice")),
            Arc::new(profiles),
        )
    }

    #[tokio::test]
    async fn miss_falls_back_to_providers_and_primes_the_cache() {
        let manager = manager().await;

        let entry = manager.current().await.unwrap();
        assert_eq!(entry.user_id, UserId("alice".into()));
        assert_eq!(entry.display_name.as_deref(), Some("Alice"));
        assert_eq!(entry.role, Some(Role::Seeker));

        assert!(manager.cache().read().await.is_some());
    }

    #[tokio::test]
    async fn cached_entry_short_circuits_the_providers() {
        let manager = manager().await;
        manager.current().await.unwrap();

        // With the cache primed, a dead identity provider goes unnoticed.
        manager.identity.fail_auth(true);
        let entry = manager.current().await.unwrap();
        assert_eq!(entry.user_id, UserId("alice".into()));
    }

    #[tokio::test]
    async fn provider_failure_surfaces_when_nothing_is_cached() {
        let manager = manager().await;
        manager.identity.fail_auth(true);

        let err = manager.current().await.unwrap_err();
        assert!(matches!(err, PerchError::Auth(_)));
    }

    #[tokio::test]
    async fn sign_out_invalidates_the_cache() {
        let manager = manager().await;
        manager.current().await.unwrap();
        manager.sign_out().await.unwrap();

        assert!(manager.cache().read().await.is_none());

        // The next lookup goes back to the providers.
        let entry = manager.current().await.unwrap();
        assert_eq!(entry.user_id, UserId("alice".into()));
    }
}
