// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile store trait, used to resolve display names and avatars for
//! message and thread rendering.

use async_trait::async_trait;

use crate::error::PerchError;
use crate::types::{ProfileSummary, UserId};

/// Read-only access to public profile data.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the display summary for a user, `None` when the profile does
    /// not exist. A missing profile is tolerated by every caller.
    async fn profile(&self, id: &UserId) -> Result<Option<ProfileSummary>, PerchError>;
}
