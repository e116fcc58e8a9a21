// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort saved-listings list in the local key-value store.
//!
//! Mirrors the offline wishlist: reads degrade to an empty list on any
//! failure, writes surface errors so the caller can retry.

use std::sync::Arc;

use tracing::warn;

use perch_core::{KeyValueStore, ListingId, PerchError};

const SAVED_KEY: &str = "saved_listings";

/// The viewer's saved-listings list.
pub struct SavedListings<K> {
    kv: Arc<K>,
}

impl<K: KeyValueStore> SavedListings<K> {
    pub fn new(kv: Arc<K>) -> Self {
        Self { kv }
    }

    /// All saved listing ids, empty on read failure or corruption.
    pub async fn list(&self) -> Vec<ListingId> {
        let raw = match self.kv.get(SAVED_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "saved listings read failed, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "saved listings corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    pub async fn is_saved(&self, id: &ListingId) -> bool {
        self.list().await.contains(id)
    }

    /// Add `id` if not already present.
    pub async fn save(&self, id: ListingId) -> Result<(), PerchError> {
        let mut ids = self.list().await;
        if !ids.contains(&id) {
            ids.push(id);
            self.persist(&ids).await?;
        }
        Ok(())
    }

    /// Remove `id` if present.
    pub async fn unsave(&self, id: &ListingId) -> Result<(), PerchError> {
        let mut ids = self.list().await;
        let before = ids.len();
        ids.retain(|saved| saved != id);
        if ids.len() != before {
            self.persist(&ids).await?;
        }
        Ok(())
    }

    async fn persist(&self, ids: &[ListingId]) -> Result<(), PerchError> {
        let raw = serde_json::to_string(ids)
            .map_err(|e| PerchError::Internal(format!("saved listings serialization: {e}")))?;
        self.kv.set(SAVED_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    use crate::kv::FileKvStore;

    #[tokio::test]
    async fn save_list_unsave_round_trip() {
        let dir = tempdir().unwrap();
        let saved = SavedListings::new(Arc::new(FileKvStore::new(dir.path())));

        saved.save(ListingId("room-1".into())).await.unwrap();
        saved.save(ListingId("room-2".into())).await.unwrap();
        // Saving twice does not duplicate.
        saved.save(ListingId("room-1".into())).await.unwrap();

        assert_eq!(
            saved.list().await,
            vec![ListingId("room-1".into()), ListingId("room-2".into())]
        );
        assert!(saved.is_saved(&ListingId("room-1".into())).await);

        saved.unsave(&ListingId("room-1".into())).await.unwrap();
        assert_eq!(saved.list().await, vec![ListingId("room-2".into())]);
    }

    #[tokio::test]
    async fn corrupt_list_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let kv = Arc::new(FileKvStore::new(dir.path()));
        kv.set(SAVED_KEY, "not-a-json-array").await.unwrap();

        let saved = SavedListings::new(Arc::clone(&kv));
        assert!(saved.list().await.is_empty());

        // A save after corruption starts a fresh list.
        saved.save(ListingId("room-9".into())).await.unwrap();
        assert_eq!(saved.list().await, vec![ListingId("room-9".into())]);
    }
}
