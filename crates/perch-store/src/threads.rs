// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread registry: one row per distinct (listing, counterpart) pair.
//!
//! A read-mostly, eventually-consistent view. It may lag the live channel
//! by a few seconds; selecting a thread always triggers a fresh history
//! fetch, which is what corrects unread counts.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use perch_core::{
    MessageRepository, PerchError, ProfileStore, Thread, ThreadKey, UserId,
};

/// Aggregates the viewer's messages into thread rows.
pub struct ThreadRegistry<R, P> {
    repo: Arc<R>,
    profiles: Arc<P>,
}

impl<R: MessageRepository, P: ProfileStore> ThreadRegistry<R, P> {
    pub fn new(repo: Arc<R>, profiles: Arc<P>) -> Self {
        Self { repo, profiles }
    }

    /// One thread per distinct (listing, counterpart) group, most recently
    /// active first. The newest message of each group is the preview;
    /// unread messages addressed to the viewer are summed per group.
    pub async fn list_threads(&self, viewer: &UserId) -> Result<Vec<Thread>, PerchError> {
        // Most recent first, so the first message seen per group is its
        // preview and group discovery order is already the display order.
        let messages = self.repo.list_for_user(viewer).await?;

        let mut order: Vec<ThreadKey> = Vec::new();
        let mut previews: HashMap<ThreadKey, (String, DateTime<Utc>)> = HashMap::new();
        let mut unread: HashMap<ThreadKey, u32> = HashMap::new();

        for msg in &messages {
            let Some(counterpart) = msg.counterpart_of(viewer) else {
                continue;
            };
            let key = ThreadKey {
                counterpart: counterpart.clone(),
                listing: msg.listing_id.clone(),
            };

            if !previews.contains_key(&key) {
                let preview = if msg.text.is_empty() {
                    msg.attachment
                        .as_ref()
                        .map(|a| format!("\u{1F4CE} {}", a.name))
                        .unwrap_or_default()
                } else {
                    msg.text.clone()
                };
                previews.insert(key.clone(), (preview, msg.created_at));
                order.push(key.clone());
            }
            if msg.is_unread_for(viewer) {
                *unread.entry(key).or_default() += 1;
            }
        }

        let mut threads = Vec::with_capacity(order.len());
        for key in order {
            let (last_message_preview, last_activity) = previews
                .remove(&key)
                .ok_or_else(|| PerchError::Internal("thread preview missing".into()))?;

            // Missing profiles are tolerated; the row renders without a name.
            let profile = self.profiles.profile(&key.counterpart).await?;
            threads.push(Thread {
                unread_count: unread.get(&key).copied().unwrap_or(0),
                counterpart_name: profile.as_ref().map(|p| p.display_name.clone()),
                counterpart_avatar: profile.and_then(|p| p.avatar_url),
                key,
                last_message_preview,
                last_activity,
            });
        }

        debug!(count = threads.len(), "thread registry listed");
        Ok(threads)
    }
}

/// Human-readable "last activity" label for a thread row.
pub fn activity_label(last_activity: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - last_activity;
    if elapsed.num_hours() < 1 {
        "Just now".to_string()
    } else if elapsed.num_hours() < 24 {
        last_activity.format("%H:%M").to_string()
    } else if elapsed.num_hours() < 48 {
        "Yesterday".to_string()
    } else if elapsed.num_hours() < 168 {
        last_activity.format("%a").to_string()
    } else {
        last_activity.format("%b %-d").to_string()
    }
}
