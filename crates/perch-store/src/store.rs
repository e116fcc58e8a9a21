// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message history fetch, batched mark-read, and send.

use std::sync::Arc;

use tracing::{debug, warn};

use perch_core::{
    ListingId, Message, MessageDraft, MessageId, MessageRepository, PerchError, UserId,
};

/// History bound for a direct thread view.
pub const DIRECT_HISTORY_LIMIT: usize = 200;
/// History bound for a listing-scoped thread view.
pub const LISTING_HISTORY_LIMIT: usize = 50;

/// Fetches, marks read, and persists messages through a repository.
pub struct MessageStore<R> {
    repo: Arc<R>,
}

impl<R: MessageRepository> MessageStore<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Fetch the conversation between `viewer` and `other`, ascending by
    /// `created_at`, bounded to the most recent `limit`.
    ///
    /// Every fetched message addressed to the viewer and still unread is
    /// marked read in one batched update before this returns, so the
    /// thread counts as seen for unread accounting. A mark-read failure is
    /// logged but does not fail the fetch.
    pub async fn fetch_history(
        &self,
        viewer: &UserId,
        other: &UserId,
        listing: Option<&ListingId>,
        limit: usize,
    ) -> Result<Vec<Message>, PerchError> {
        let messages = self
            .repo
            .fetch_conversation(viewer, other, listing, limit)
            .await?;

        let unread: Vec<MessageId> = messages
            .iter()
            .filter(|m| m.is_unread_for(viewer))
            .map(|m| m.id.clone())
            .collect();
        if !unread.is_empty() {
            debug!(count = unread.len(), "marking fetched messages read");
            if let Err(e) = self.repo.mark_read(&unread).await {
                warn!(error = %e, "mark-read batch failed, unread counts will lag");
            }
        }

        Ok(messages)
    }

    /// Persist exactly the fields present on `draft` and return the stored
    /// message with its server-assigned id and timestamp.
    ///
    /// Failures surface to the caller so the UI can distinguish "still
    /// sending" from "delivered". Never waits on the sync engine; the
    /// sender reconciles through its own echo or re-fetch.
    pub async fn send(&self, draft: &MessageDraft) -> Result<Message, PerchError> {
        if draft.is_empty() {
            return Err(PerchError::EmptyDraft);
        }
        let message = self.repo.insert(draft).await?;
        debug!(id = %message.id.0, "message persisted");
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perch_test_utils::MockRepository;

    fn draft(sender: &str, receiver: &str, text: &str) -> MessageDraft {
        MessageDraft {
            sender_id: UserId(sender.into()),
            receiver_id: UserId(receiver.into()),
            listing_id: None,
            text: text.into(),
            formatted_html: None,
            attachment: None,
        }
    }

    #[tokio::test]
    async fn fetch_returns_ascending_history() {
        let repo = Arc::new(MockRepository::new());
        let store = MessageStore::new(Arc::clone(&repo));

        repo.insert(&draft("a", "b", "first")).await.unwrap();
        repo.insert(&draft("b", "a", "second")).await.unwrap();
        repo.insert(&draft("a", "b", "third")).await.unwrap();

        let viewer = UserId("a".into());
        let other = UserId("b".into());
        let history = store
            .fetch_history(&viewer, &other, None, DIRECT_HISTORY_LIMIT)
            .await
            .unwrap();

        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        assert_eq!(history[0].text, "first");
        assert_eq!(history[2].text, "third");
    }

    #[tokio::test]
    async fn fetch_marks_viewer_addressed_messages_read() {
        let repo = Arc::new(MockRepository::new());
        let store = MessageStore::new(Arc::clone(&repo));

        repo.insert(&draft("b", "a", "unread one")).await.unwrap();
        repo.insert(&draft("b", "a", "unread two")).await.unwrap();
        repo.insert(&draft("a", "b", "my own")).await.unwrap();

        let viewer = UserId("a".into());
        let other = UserId("b".into());
        store
            .fetch_history(&viewer, &other, None, DIRECT_HISTORY_LIMIT)
            .await
            .unwrap();

        let rows = repo.rows().await;
        // Messages addressed to the viewer are now read...
        assert!(rows
            .iter()
            .filter(|m| m.receiver_id == viewer)
            .all(|m| m.read_at.is_some()));
        // ...but the viewer's own outgoing message is untouched.
        assert!(rows
            .iter()
            .filter(|m| m.sender_id == viewer)
            .all(|m| m.read_at.is_none()));
    }

    #[tokio::test]
    async fn send_surfaces_repository_failure() {
        let repo = Arc::new(MockRepository::new());
        let store = MessageStore::new(Arc::clone(&repo));

        repo.fail_inserts(true);
        let err = store.send(&draft("a", "b", "hello")).await.unwrap_err();
        assert!(matches!(err, PerchError::Storage { .. }));
    }

    #[tokio::test]
    async fn empty_draft_is_refused() {
        let repo = Arc::new(MockRepository::new());
        let store = MessageStore::new(repo);

        let err = store.send(&draft("a", "b", "   ")).await.unwrap_err();
        assert!(matches!(err, PerchError::EmptyDraft));
    }

    #[tokio::test]
    async fn fetch_failure_surfaces_to_caller() {
        let repo = Arc::new(MockRepository::new());
        let store = MessageStore::new(Arc::clone(&repo));
        repo.insert(&draft("b", "a", "hello")).await.unwrap();

        repo.fail_fetches(true);
        let viewer = UserId("a".into());
        let other = UserId("b".into());
        let err = store
            .fetch_history(&viewer, &other, None, DIRECT_HISTORY_LIMIT)
            .await
            .unwrap_err();
        assert!(matches!(err, PerchError::Storage { .. }));
    }
}
