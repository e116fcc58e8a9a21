// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Perch messaging client.
//!
//! This crate provides the foundational trait definitions, error type, and
//! common types used throughout the Perch workspace. External collaborators
//! (identity, profiles, the message table, the push channel, object storage,
//! and the local key-value store) are consumed through the traits defined
//! here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PerchError;
pub use types::{
    AttachmentRef, Credentials, ListingId, Message, MessageDraft, MessageId, ProfileSummary,
    Role, SessionEntry, SessionSummary, Thread, ThreadKey, UserId,
};

// Re-export all adapter traits at crate root.
pub use traits::{
    IdentityProvider, KeyValueStore, MessageRepository, ObjectStore, ProfileStore, PushChannel,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message_between(sender: &str, receiver: &str) -> Message {
        Message {
            id: MessageId("m1".into()),
            sender_id: UserId(sender.into()),
            receiver_id: UserId(receiver.into()),
            listing_id: None,
            text: "hi".into(),
            formatted_html: None,
            attachment: None,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn pair_matching_is_direction_agnostic() {
        let msg = message_between("alice", "bob");
        let alice = UserId("alice".into());
        let bob = UserId("bob".into());
        let carol = UserId("carol".into());

        assert!(msg.involves_pair(&alice, &bob));
        assert!(msg.involves_pair(&bob, &alice));
        assert!(!msg.involves_pair(&alice, &carol));
    }

    #[test]
    fn counterpart_resolution() {
        let msg = message_between("alice", "bob");
        let alice = UserId("alice".into());
        let bob = UserId("bob".into());
        let carol = UserId("carol".into());

        assert_eq!(msg.counterpart_of(&alice), Some(&bob));
        assert_eq!(msg.counterpart_of(&bob), Some(&alice));
        assert_eq!(msg.counterpart_of(&carol), None);
    }

    #[test]
    fn unread_is_receiver_side_only() {
        let mut msg = message_between("alice", "bob");
        let alice = UserId("alice".into());
        let bob = UserId("bob".into());

        assert!(msg.is_unread_for(&bob));
        assert!(!msg.is_unread_for(&alice));

        msg.read_at = Some(Utc::now());
        assert!(!msg.is_unread_for(&bob));
    }

    #[test]
    fn empty_draft_detection() {
        let mut draft = MessageDraft {
            sender_id: UserId("a".into()),
            receiver_id: UserId("b".into()),
            listing_id: None,
            text: "   ".into(),
            formatted_html: None,
            attachment: None,
        };
        assert!(draft.is_empty());

        draft.attachment = Some(AttachmentRef {
            url: "https://cdn.example/x.png".into(),
            name: "x.png".into(),
            mime: "image/png".into(),
        });
        assert!(!draft.is_empty());
    }

    #[test]
    fn thread_topics_are_scoped() {
        let direct = ThreadKey::direct(UserId("bob".into()));
        let scoped =
            ThreadKey::for_listing(UserId("bob".into()), ListingId("listing-9".into()));

        assert_eq!(direct.topic(), "dm:direct:bob");
        assert_eq!(scoped.topic(), "dm:listing-9:bob");
        assert_ne!(direct.topic(), scoped.topic());
    }

    #[test]
    fn optional_message_fields_are_omitted_from_json() {
        let msg = message_between("alice", "bob");
        let json = serde_json::to_string(&msg).expect("should serialize");
        assert!(!json.contains("formatted_html"));
        assert!(!json.contains("attachment"));
        assert!(!json.contains("read_at"));
        assert!(!json.contains("listing_id"));
    }

    #[test]
    fn role_round_trips_through_strings() {
        use std::str::FromStr;

        for role in [Role::Seeker, Role::Owner] {
            let s = role.to_string();
            assert_eq!(Role::from_str(&s).expect("should parse back"), role);
        }
        assert_eq!(Role::Seeker.to_string(), "seeker");
    }
}
