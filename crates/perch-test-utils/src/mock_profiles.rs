// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock profile store backed by a fixed map.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use perch_core::{PerchError, ProfileStore, ProfileSummary, UserId};

/// Profile store returning pre-registered summaries.
pub struct MockProfiles {
    profiles: Mutex<HashMap<UserId, ProfileSummary>>,
}

impl MockProfiles {
    pub fn new() -> Self {
        Self {
            profiles: Mutex::new(HashMap::new()),
        }
    }

    pub async fn register(&self, profile: ProfileSummary) {
        self.profiles.lock().await.insert(profile.id.clone(), profile);
    }
}

impl Default for MockProfiles {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for MockProfiles {
    async fn profile(&self, id: &UserId) -> Result<Option<ProfileSummary>, PerchError> {
        Ok(self.profiles.lock().await.get(id).cloned())
    }
}
