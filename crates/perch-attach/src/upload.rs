// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-bucket attachment upload.
//!
//! Every upload tries the primary bucket first, then the fallback bucket at
//! an equivalent path. The primary failure is retained and reported rather
//! than swallowed by the fallback attempt. Uploaded objects are immutable;
//! a retry after failure writes a fresh path instead of overwriting.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{debug, warn};

use perch_config::model::StorageConfig;
use perch_core::{AttachmentRef, ObjectStore, PerchError, UserId};

use crate::selection::PendingAttachment;

/// Which bucket ended up holding the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    Primary,
    Fallback,
}

/// A successful upload: the message-ready reference plus where it landed,
/// so callers can observe degraded delivery.
#[derive(Debug, Clone)]
pub struct UploadedAttachment {
    pub attachment: AttachmentRef,
    pub target: UploadTarget,
}

/// Uploads attachments into owner-scoped, collision-resistant paths.
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    config: StorageConfig,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>, config: StorageConfig) -> Self {
        Self { store, config }
    }

    /// Upload one attachment for `owner`.
    ///
    /// On primary failure the fallback bucket is attempted at the same
    /// path; if both fail the returned error carries both reasons.
    pub async fn upload(
        &self,
        attachment: &PendingAttachment,
        owner: &UserId,
    ) -> Result<UploadedAttachment, PerchError> {
        let path = self.object_path(owner, &attachment.name);

        let primary_err = match self
            .store
            .put(
                &self.config.primary_bucket,
                &path,
                &attachment.bytes,
                &attachment.mime,
            )
            .await
        {
            Ok(url) => {
                debug!(bucket = %self.config.primary_bucket, path, "attachment uploaded");
                return Ok(UploadedAttachment {
                    attachment: self.reference(attachment, url),
                    target: UploadTarget::Primary,
                });
            }
            Err(e) => e,
        };

        warn!(
            error = %primary_err,
            bucket = %self.config.primary_bucket,
            "primary bucket rejected upload, trying fallback"
        );

        match self
            .store
            .put(
                &self.config.fallback_bucket,
                &path,
                &attachment.bytes,
                &attachment.mime,
            )
            .await
        {
            Ok(url) => {
                debug!(bucket = %self.config.fallback_bucket, path, "attachment uploaded via fallback");
                Ok(UploadedAttachment {
                    attachment: self.reference(attachment, url),
                    target: UploadTarget::Fallback,
                })
            }
            Err(fallback_err) => Err(PerchError::UploadFailed {
                primary: primary_err.to_string(),
                fallback: fallback_err.to_string(),
            }),
        }
    }

    fn reference(&self, attachment: &PendingAttachment, url: String) -> AttachmentRef {
        AttachmentRef {
            url,
            name: attachment.name.clone(),
            mime: attachment.mime.clone(),
        }
    }

    /// `<namespace>/<owner>/<timestamp>_<random>.<ext>`, fresh on every
    /// call, so a retried upload never collides with an earlier attempt.
    fn object_path(&self, owner: &UserId, file_name: &str) -> String {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
            .unwrap_or("bin");
        let random: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect();
        format!(
            "{}/{}/{}_{random}.{ext}",
            self.config.namespace,
            owner.0,
            Utc::now().timestamp_millis(),
        )
    }
}
