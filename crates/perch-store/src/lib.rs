// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message persistence layer for the Perch messaging client.
//!
//! [`MessageStore`] handles bounded history fetch (with batched mark-read)
//! and send; [`ThreadRegistry`] derives the per-conversation overview.

pub mod store;
pub mod threads;

pub use store::{DIRECT_HISTORY_LIMIT, LISTING_HISTORY_LIMIT, MessageStore};
pub use threads::{ThreadRegistry, activity_label};
