// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the marketplace REST and websocket surfaces.
//!
//! The message table keeps the attachment triple as three nullable columns;
//! the domain type folds them into one optional reference. Conversions in
//! both directions live here so neither the HTTP client nor the push
//! channel duplicates the mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use perch_core::{AttachmentRef, ListingId, Message, MessageDraft, MessageId, UserId};

/// One row of the remote message table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
    pub message_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        // The triple is all-or-nothing; a partial row degrades to no
        // attachment rather than a half-formed reference.
        let attachment = match (row.attachment_url, row.attachment_name, row.attachment_type) {
            (Some(url), Some(name), Some(mime)) => Some(AttachmentRef { url, name, mime }),
            _ => None,
        };
        Message {
            id: MessageId(row.id),
            sender_id: UserId(row.sender_id),
            receiver_id: UserId(row.receiver_id),
            listing_id: row.listing_id.map(ListingId),
            text: row.message_text,
            formatted_html: row.message_html,
            attachment,
            read_at: row.read_at,
            created_at: row.created_at,
        }
    }
}

/// Body for `POST /messages/send`: exactly the fields the client controls.
#[derive(Debug, Clone, Serialize)]
pub struct SendPayload {
    pub sender_id: String,
    pub receiver_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
    pub message_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_type: Option<String>,
}

impl From<&MessageDraft> for SendPayload {
    fn from(draft: &MessageDraft) -> Self {
        let (attachment_url, attachment_name, attachment_type) = match &draft.attachment {
            Some(a) => (
                Some(a.url.clone()),
                Some(a.name.clone()),
                Some(a.mime.clone()),
            ),
            None => (None, None, None),
        };
        SendPayload {
            sender_id: draft.sender_id.0.clone(),
            receiver_id: draft.receiver_id.0.clone(),
            listing_id: draft.listing_id.as_ref().map(|l| l.0.clone()),
            message_text: draft.text.clone(),
            message_html: draft.formatted_html.clone(),
            attachment_url,
            attachment_name,
            attachment_type,
        }
    }
}

/// `{"messages": [...]}` envelope returned by the history endpoints.
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<MessageRow>,
}

/// `{"success": ..., "message": {...}}` envelope returned by the send
/// endpoint.
#[derive(Debug, Deserialize)]
pub struct SendResponse {
    pub message: MessageRow,
}

/// Body for the batched `PATCH /messages/read`.
#[derive(Debug, Serialize)]
pub struct MarkReadPayload {
    pub message_ids: Vec<String>,
}

/// Public profile row as served by `GET /profiles/{id}`.
#[derive(Debug, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub custom_pfp: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Websocket frame envelope: `{"type": ..., "payload": ...}`.
///
/// Only `message` frames matter to the sync engine; acks and out-of-band
/// errors are logged and skipped.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum WsFrame {
    Message(MessageRow),
    Ack(serde_json::Value),
    Error(serde_json::Value),
}
