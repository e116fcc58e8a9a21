// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! High-level messaging client for the Perch marketplace.
//!
//! [`Conversation`] is what a thread view mounts: it hydrates history,
//! keeps the live subscription honest across thread switches, and drives
//! the sequential send pipeline in [`composer`].

pub mod composer;
pub mod conversation;
pub mod session;

pub use composer::{AttachmentOutcome, SendOutcome, SendPipeline, SendStage};
pub use conversation::Conversation;
pub use session::SessionManager;
