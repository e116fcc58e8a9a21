// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message repository trait over the relational message table.

use async_trait::async_trait;

use crate::error::PerchError;
use crate::types::{ListingId, Message, MessageDraft, MessageId, UserId};

/// Persistence operations for the message table.
///
/// The table is queried with an OR-of-two-orderings filter on the
/// `(sender_id, receiver_id)` pair and an ascending timestamp sort;
/// inserts return the row with its generated id and timestamp.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// All messages between `a` and `b` (either direction), optionally
    /// scoped to one listing, ascending by `created_at`, bounded to the
    /// most recent `limit`.
    async fn fetch_conversation(
        &self,
        a: &UserId,
        b: &UserId,
        listing: Option<&ListingId>,
        limit: usize,
    ) -> Result<Vec<Message>, PerchError>;

    /// Every message the user sent or received, most recent first. Feeds
    /// the thread registry aggregation.
    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Message>, PerchError>;

    /// Insert a single message. The repository assigns `id` and
    /// `created_at` and returns the persisted row.
    async fn insert(&self, draft: &MessageDraft) -> Result<Message, PerchError>;

    /// Set `read_at` for the given ids in one batched update.
    async fn mark_read(&self, ids: &[MessageId]) -> Result<(), PerchError>;
}
