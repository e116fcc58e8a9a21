// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The rendered conversation: an ordered, deduplicating message list.
//!
//! Local-optimistic sends and remote push confirmations are two independent
//! feeds converging here; the id set is the single source of truth for
//! "have we already rendered this message". Ordering is by `created_at`
//! with insertion order as the tiebreak for equal timestamps.

use std::collections::HashSet;

use perch_core::{Message, MessageId};

/// Ordered, deduplicating log of one conversation's messages.
#[derive(Debug, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
    seen: HashSet<MessageId>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one message. Returns `false` (a strict no-op) when the id has
    /// already been rendered.
    ///
    /// In-order arrivals append; an out-of-order arrival is placed by
    /// timestamp without reordering existing entries.
    pub fn insert(&mut self, message: Message) -> bool {
        if !self.seen.insert(message.id.clone()) {
            return false;
        }
        let position = self
            .messages
            .partition_point(|m| m.created_at <= message.created_at);
        self.messages.insert(position, message);
        true
    }

    /// Insert a whole fetched history. Returns how many messages were new.
    pub fn hydrate(&mut self, messages: impl IntoIterator<Item = Message>) -> usize {
        messages
            .into_iter()
            .filter(|m| self.insert(m.clone()))
            .count()
    }

    /// Mark every message addressed to `viewer` as read locally, mirroring
    /// the repository-side batch update.
    pub fn mark_read_for(
        &mut self,
        viewer: &perch_core::UserId,
        read_at: chrono::DateTime<chrono::Utc>,
    ) {
        for message in &mut self.messages {
            if message.receiver_id == *viewer && message.read_at.is_none() {
                message.read_at = Some(read_at);
            }
        }
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.seen.contains(id)
    }

    /// Messages in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop everything; used when the view switches threads.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use perch_core::UserId;

    fn message(id: &str, offset_secs: i64) -> Message {
        let base = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        Message {
            id: MessageId(id.into()),
            sender_id: UserId("a".into()),
            receiver_id: UserId("b".into()),
            listing_id: None,
            text: id.into(),
            formatted_html: None,
            attachment: None,
            read_at: None,
            created_at: base + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn in_order_inserts_append() {
        let mut log = ConversationLog::new();
        assert!(log.insert(message("m1", 0)));
        assert!(log.insert(message("m2", 1)));
        assert!(log.insert(message("m3", 2)));

        let ids: Vec<&str> = log.messages().iter().map(|m| m.id.0.as_str()).collect();
        assert_eq!(ids, ["m1", "m2", "m3"]);
    }

    #[test]
    fn out_of_order_arrival_is_placed_by_timestamp() {
        let mut log = ConversationLog::new();
        log.insert(message("m1", 0));
        log.insert(message("m3", 10));
        // A push that arrives late but was created earlier.
        log.insert(message("m2", 5));

        let ids: Vec<&str> = log.messages().iter().map(|m| m.id.0.as_str()).collect();
        assert_eq!(ids, ["m1", "m2", "m3"]);
        assert!(
            log.messages()
                .windows(2)
                .all(|w| w[0].created_at <= w[1].created_at)
        );
    }

    #[test]
    fn duplicate_id_is_a_noop() {
        let mut log = ConversationLog::new();
        assert!(log.insert(message("m1", 0)));
        let before = log.len();

        assert!(!log.insert(message("m1", 0)));
        // Even a duplicate claiming a different timestamp is discarded.
        assert!(!log.insert(message("m1", 99)));
        assert_eq!(log.len(), before);
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let mut log = ConversationLog::new();
        log.insert(message("first", 7));
        log.insert(message("second", 7));

        let ids: Vec<&str> = log.messages().iter().map(|m| m.id.0.as_str()).collect();
        assert_eq!(ids, ["first", "second"]);
    }

    #[test]
    fn hydrate_then_echo_does_not_duplicate() {
        let mut log = ConversationLog::new();
        let added = log.hydrate(vec![message("m1", 0), message("m2", 1)]);
        assert_eq!(added, 2);

        // The sender's own echo arrives over the push channel after the
        // optimistic re-fetch already rendered it.
        assert!(!log.insert(message("m2", 1)));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn mark_read_touches_only_viewer_addressed_messages() {
        let mut log = ConversationLog::new();
        log.insert(message("m1", 0)); // a -> b
        let mut reply = message("m2", 1);
        reply.sender_id = UserId("b".into());
        reply.receiver_id = UserId("a".into());
        log.insert(reply);

        log.mark_read_for(&UserId("b".into()), Utc::now());
        assert!(log.messages()[0].read_at.is_some());
        assert!(log.messages()[1].read_at.is_none());
    }

    #[test]
    fn clear_resets_dedup_state() {
        let mut log = ConversationLog::new();
        log.insert(message("m1", 0));
        log.clear();

        assert!(log.is_empty());
        assert!(!log.contains(&MessageId("m1".into())));
        assert!(log.insert(message("m1", 0)));
    }
}
