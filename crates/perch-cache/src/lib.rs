// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-local persistence for the Perch messaging client.
//!
//! Provides the file-backed [`FileKvStore`], the TTL-bound [`SessionCache`]
//! shared across mounted views, and the best-effort [`SavedListings`] list.
//! Everything here is an optimization layer: reads degrade to absent/empty
//! rather than failing the caller.

pub mod kv;
pub mod saved;
pub mod session;

pub use kv::FileKvStore;
pub use saved::SavedListings;
pub use session::{Clock, SESSION_TOPIC, SessionCache};
