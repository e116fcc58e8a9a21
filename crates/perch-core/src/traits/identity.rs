// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity provider trait. Login, token issuance, and refresh are external;
//! the messaging core only ever asks for the current credentials.

use async_trait::async_trait;

use crate::error::PerchError;
use crate::types::Credentials;

/// Supplies the authenticated identity for every repository and upload call.
///
/// A call failing with [`PerchError::Auth`] is surfaced to the caller as a
/// fetch/send failure, never retried here.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the current user id and bearer credential.
    async fn credentials(&self) -> Result<Credentials, PerchError>;
}
