// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Push channel trait over the live insert-event stream.

use async_trait::async_trait;

use crate::error::PerchError;
use crate::types::Message;

/// Server-initiated stream of newly inserted messages.
///
/// The transport may be conversation-agnostic and deliver a superset of
/// events; consumers filter at the edge. Reconnection on transient network
/// loss is the transport's concern, not the consumer's.
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Wait for the next inserted message, whichever conversation it
    /// belongs to.
    async fn recv(&self) -> Result<Message, PerchError>;
}
