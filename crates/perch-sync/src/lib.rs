// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Real-time synchronization for the Perch messaging client.
//!
//! [`ConversationLog`] merges the fetch and push feeds into one ordered,
//! deduplicated list; [`SyncEngine`] drives the push side and owns
//! subscription lifecycle.

pub mod engine;
pub mod log;

pub use engine::{SyncEngine, SyncSubscription};
pub use log::ConversationLog;
