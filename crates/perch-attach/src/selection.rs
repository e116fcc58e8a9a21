// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File selection and validation.
//!
//! A selection batch is validated against the per-file size ceiling and the
//! in-flight cap before anything is queued. Rejections are counted and
//! reported, never silent.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use uuid::Uuid;

use perch_config::model::LimitsConfig;

/// A file as handed over by the UI on selection.
#[derive(Debug, Clone)]
pub struct FileInput {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A validated attachment waiting to be sent.
///
/// Has no server identity until upload succeeds; the correlation id exists
/// purely for queue management and the remove-before-send action.
#[derive(Debug, Clone)]
pub struct PendingAttachment {
    pub id: Uuid,
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    /// Base64 data URL for immediate UI feedback; image types only.
    pub preview: Option<String>,
}

impl PendingAttachment {
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// Outcome of validating one selection batch.
#[derive(Debug, Default)]
pub struct Selection {
    pub accepted: Vec<PendingAttachment>,
    /// Files over the per-file size ceiling, rejected with a user-facing
    /// count.
    pub rejected_oversize: usize,
    /// Files beyond the in-flight cap for this batch, dropped with a
    /// reported count.
    pub dropped_over_cap: usize,
}

impl Selection {
    /// True when anything was rejected or dropped and the UI owes the user
    /// a notice.
    pub fn has_losses(&self) -> bool {
        self.rejected_oversize > 0 || self.dropped_over_cap > 0
    }
}

/// Validate a selection batch against `limits`, given how many attachments
/// are already queued for this draft.
///
/// Oversize files are rejected first; the cap then applies to what remains,
/// in selection order.
pub async fn select_files(
    files: Vec<FileInput>,
    already_queued: usize,
    limits: &LimitsConfig,
) -> Selection {
    let mut selection = Selection::default();
    let capacity = limits.max_attachments.saturating_sub(already_queued);

    for file in files {
        if file.bytes.len() as u64 > limits.max_file_bytes {
            selection.rejected_oversize += 1;
            continue;
        }
        if selection.accepted.len() >= capacity {
            selection.dropped_over_cap += 1;
            continue;
        }

        let preview = decode_preview(&file).await;
        selection.accepted.push(PendingAttachment {
            id: Uuid::new_v4(),
            name: file.name,
            mime: file.mime,
            bytes: file.bytes,
            preview,
        });
    }
    selection
}

/// Render a data-URL preview for image files; non-images get none.
async fn decode_preview(file: &FileInput) -> Option<String> {
    if !file.mime.starts_with("image/") {
        return None;
    }
    let encoded = BASE64.encode(&file.bytes);
    Some(format!("data:{};base64,{encoded}", file.mime))
}
