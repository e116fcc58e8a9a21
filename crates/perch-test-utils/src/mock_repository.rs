// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory mock of the relational message table.
//!
//! Assigns ids and timestamps the way the real table does (on insert,
//! monotonically), supports seeding historical rows, and can be told to
//! fail operations to exercise error surfacing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Mutex;

use perch_core::{
    ListingId, Message, MessageDraft, MessageId, MessageRepository, PerchError, UserId,
};

/// In-memory message table.
pub struct MockRepository {
    rows: Arc<Mutex<Vec<Message>>>,
    next_id: AtomicU64,
    /// Milliseconds since epoch for the next assigned timestamp; advances
    /// by one second per insert so ordering is deterministic.
    now_millis: AtomicI64,
    fail_inserts: AtomicBool,
    fail_fetches: AtomicBool,
    insert_delay_ms: AtomicU64,
    fetch_delay_ms: AtomicU64,
}

impl MockRepository {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
            now_millis: AtomicI64::new(1_750_000_000_000),
            fail_inserts: AtomicBool::new(false),
            fail_fetches: AtomicBool::new(false),
            insert_delay_ms: AtomicU64::new(0),
            fetch_delay_ms: AtomicU64::new(0),
        }
    }

    /// Insert pre-built rows directly, bypassing id/timestamp assignment.
    pub async fn seed(&self, messages: impl IntoIterator<Item = Message>) {
        self.rows.lock().await.extend(messages);
    }

    /// Snapshot of every stored row, insertion order.
    pub async fn rows(&self) -> Vec<Message> {
        self.rows.lock().await.clone()
    }

    /// Make subsequent `insert` calls fail with a storage error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent fetches fail with a storage error.
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Delay every insert, for exercising in-flight send guards.
    pub fn set_insert_delay_ms(&self, millis: u64) {
        self.insert_delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Delay every conversation fetch, for exercising stale-response
    /// cancellation.
    pub fn set_fetch_delay_ms(&self, millis: u64) {
        self.fetch_delay_ms.store(millis, Ordering::SeqCst);
    }

    async fn apply_delay(delay: &AtomicU64) {
        let millis = delay.load(Ordering::SeqCst);
        if millis > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
        }
    }

    fn next_timestamp(&self) -> DateTime<Utc> {
        let millis = self.now_millis.fetch_add(1_000, Ordering::SeqCst);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageRepository for MockRepository {
    async fn fetch_conversation(
        &self,
        a: &UserId,
        b: &UserId,
        listing: Option<&ListingId>,
        limit: usize,
    ) -> Result<Vec<Message>, PerchError> {
        Self::apply_delay(&self.fetch_delay_ms).await;
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(PerchError::Storage {
                message: "injected fetch failure".into(),
                source: None,
            });
        }

        let rows = self.rows.lock().await;
        let mut matching: Vec<Message> = rows
            .iter()
            .filter(|m| m.involves_pair(a, b))
            .filter(|m| match listing {
                Some(listing) => m.listing_id.as_ref() == Some(listing),
                None => true,
            })
            .cloned()
            .collect();
        matching.sort_by_key(|m| m.created_at);

        // Most recent `limit`, still ascending.
        if matching.len() > limit {
            matching.drain(..matching.len() - limit);
        }
        Ok(matching)
    }

    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Message>, PerchError> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(PerchError::Storage {
                message: "injected fetch failure".into(),
                source: None,
            });
        }

        let rows = self.rows.lock().await;
        let mut matching: Vec<Message> = rows
            .iter()
            .filter(|m| m.sender_id == *user || m.receiver_id == *user)
            .cloned()
            .collect();
        matching.sort_by_key(|m| std::cmp::Reverse(m.created_at));
        Ok(matching)
    }

    async fn insert(&self, draft: &MessageDraft) -> Result<Message, PerchError> {
        Self::apply_delay(&self.insert_delay_ms).await;
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(PerchError::Storage {
                message: "injected insert failure".into(),
                source: None,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let message = Message {
            id: MessageId(format!("msg-{id}")),
            sender_id: draft.sender_id.clone(),
            receiver_id: draft.receiver_id.clone(),
            listing_id: draft.listing_id.clone(),
            text: draft.text.clone(),
            formatted_html: draft.formatted_html.clone(),
            attachment: draft.attachment.clone(),
            read_at: None,
            created_at: self.next_timestamp(),
        };
        self.rows.lock().await.push(message.clone());
        Ok(message)
    }

    async fn mark_read(&self, ids: &[MessageId]) -> Result<(), PerchError> {
        let read_at = self.next_timestamp();
        let mut rows = self.rows.lock().await;
        for row in rows.iter_mut() {
            if ids.contains(&row.id) && row.read_at.is_none() {
                row.read_at = Some(read_at);
            }
        }
        Ok(())
    }
}
