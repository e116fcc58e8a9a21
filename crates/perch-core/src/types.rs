// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Perch messaging client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Unique identifier for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(pub String);

/// Unique identifier for a message, assigned by the persistence layer on
/// insert. Used for dedup and equality only, never for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Marketplace role of a signed-in user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Seeker,
    Owner,
}

/// Reference to an uploaded attachment. The three fields are all-or-nothing
/// on a message: a message either carries a full triple or none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Publicly resolvable URL returned by the object store.
    pub url: String,
    /// Original file name, shown as the download label.
    pub name: String,
    /// MIME type, used to decide image rendering vs. a file badge.
    pub mime: String,
}

impl AttachmentRef {
    /// True when the attachment renders inline as an image.
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// The atomic unit of conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    /// Present when the message is scoped to a specific listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<ListingId>,
    /// Plain-text body; may be empty for attachment-only messages.
    pub text: String,
    /// Present only when `text` contains recognized markup and the rendered
    /// form differs from the plain-escaped rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentRef>,
    /// Unset until the receiver's client marks the message read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    /// Server-assigned; the sole ordering key for display.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// True when the message is addressed to `viewer` and not yet read.
    pub fn is_unread_for(&self, viewer: &UserId) -> bool {
        self.receiver_id == *viewer && self.read_at.is_none()
    }

    /// True when the message belongs to the conversation between `a` and `b`,
    /// in either direction.
    pub fn involves_pair(&self, a: &UserId, b: &UserId) -> bool {
        (self.sender_id == *a && self.receiver_id == *b)
            || (self.sender_id == *b && self.receiver_id == *a)
    }

    /// The participant who is not `viewer`, or `None` when the viewer is not
    /// a participant at all.
    pub fn counterpart_of(&self, viewer: &UserId) -> Option<&UserId> {
        if self.sender_id == *viewer {
            Some(&self.receiver_id)
        } else if self.receiver_id == *viewer {
            Some(&self.sender_id)
        } else {
            None
        }
    }
}

/// Fields the client controls when sending. The repository assigns `id` and
/// `created_at` on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDraft {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<ListingId>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentRef>,
}

impl MessageDraft {
    /// True when there is nothing to deliver.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.attachment.is_none()
    }
}

/// Identifies one conversation from the viewer's perspective: a counterpart,
/// optionally scoped to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadKey {
    pub counterpart: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<ListingId>,
}

impl ThreadKey {
    pub fn direct(counterpart: UserId) -> Self {
        Self {
            counterpart,
            listing: None,
        }
    }

    pub fn for_listing(counterpart: UserId, listing: ListingId) -> Self {
        Self {
            counterpart,
            listing: Some(listing),
        }
    }

    /// Bus topic for this conversation, scoping subscriptions so a stale
    /// handler from another thread can never fire here.
    pub fn topic(&self) -> String {
        match &self.listing {
            Some(listing) => format!("dm:{}:{}", listing.0, self.counterpart.0),
            None => format!("dm:direct:{}", self.counterpart.0),
        }
    }
}

/// One row in the thread registry: the most recent message of a conversation
/// plus unread accounting and counterpart display data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub key: ThreadKey,
    pub last_message_preview: String,
    pub last_activity: DateTime<Utc>,
    pub unread_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterpart_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterpart_avatar: Option<String>,
}

/// The cached identity/profile summary shared across mounted views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Write time; the entry is valid while `now - cached_at < ttl`.
    pub cached_at: DateTime<Utc>,
}

/// The projection published to session-cache subscribers on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub role: Option<Role>,
    pub display_name: Option<String>,
}

impl From<&SessionEntry> for SessionSummary {
    fn from(entry: &SessionEntry) -> Self {
        Self {
            role: entry.role,
            display_name: entry.display_name.clone(),
        }
    }
}

/// Display data for a user, resolved through the profile store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: UserId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// What the identity provider yields: a stable user id and a bearer
/// credential. Token refresh and expiry are opaque to this subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: UserId,
    pub bearer_token: String,
}
