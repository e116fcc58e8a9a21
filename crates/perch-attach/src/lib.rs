// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment pipeline for the Perch messaging client.
//!
//! Selection and validation live in [`selection`], the two-bucket upload in
//! [`upload`]. The sequential upload-then-persist send pipeline is driven
//! by `perch-client`, which consumes both.

pub mod selection;
pub mod upload;

pub use selection::{FileInput, PendingAttachment, Selection, select_files};
pub use upload::{UploadTarget, UploadedAttachment, Uploader};
