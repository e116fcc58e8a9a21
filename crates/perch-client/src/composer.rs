// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The sequential send pipeline.
//!
//! One outgoing draft walks `Validating -> Uploading[i] -> Persisting[i] ->
//! ... -> PersistingText -> Done`. Each uploaded file becomes its own
//! persisted message before the caption is sent, so recipients see
//! attachments above the text that may reference them. Per-file outcomes
//! are independent: one failure never rolls back or blocks siblings.

use tracing::{debug, warn};
use uuid::Uuid;

use perch_attach::{PendingAttachment, UploadTarget, Uploader};
use perch_core::{ListingId, Message, MessageDraft, MessageRepository, PerchError, UserId};
use perch_store::MessageStore;

/// Pipeline stage, reported to the progress observer as the send advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStage {
    Validating,
    /// Uploading attachment `i` (zero-based).
    Uploading(usize),
    /// Persisting the message for attachment `i`.
    Persisting(usize),
    PersistingText,
    Done,
}

/// What happened to one attachment.
#[derive(Debug)]
pub struct AttachmentOutcome {
    pub correlation_id: Uuid,
    pub name: String,
    /// The persisted message, or the first error that stopped this file.
    pub result: Result<Message, PerchError>,
    /// Where the upload landed, when it succeeded at all.
    pub target: Option<UploadTarget>,
}

/// The full result of one send: per-file outcomes plus the text message.
#[derive(Debug, Default)]
pub struct SendOutcome {
    pub attachments: Vec<AttachmentOutcome>,
    pub text: Option<Result<Message, PerchError>>,
}

impl SendOutcome {
    /// Every persisted message, in send order (attachments first).
    pub fn persisted(&self) -> Vec<&Message> {
        self.attachments
            .iter()
            .filter_map(|a| a.result.as_ref().ok())
            .chain(self.text.as_ref().and_then(|t| t.as_ref().ok()))
            .collect()
    }

    /// True when at least one part of the draft failed.
    pub fn has_failures(&self) -> bool {
        self.attachments.iter().any(|a| a.result.is_err())
            || self.text.as_ref().is_some_and(|t| t.is_err())
    }
}

/// Runs one draft through the pipeline.
pub struct SendPipeline<'a, R> {
    store: &'a MessageStore<R>,
    uploader: &'a Uploader,
}

impl<'a, R: MessageRepository> SendPipeline<'a, R> {
    pub fn new(store: &'a MessageStore<R>, uploader: &'a Uploader) -> Self {
        Self { store, uploader }
    }

    /// Execute the pipeline for one draft.
    ///
    /// `attachments` are consumed: they have served their purpose once the
    /// owning messages are persisted (or abandoned).
    pub async fn run(
        &self,
        sender: &UserId,
        receiver: &UserId,
        listing: Option<&ListingId>,
        text: &str,
        attachments: Vec<PendingAttachment>,
        observe: impl Fn(SendStage),
    ) -> Result<SendOutcome, PerchError> {
        observe(SendStage::Validating);
        let text = text.trim();
        if text.is_empty() && attachments.is_empty() {
            return Err(PerchError::EmptyDraft);
        }

        let mut outcome = SendOutcome::default();

        // Sequential, not parallel: bounds concurrent upload load and keeps
        // the recipient's ordering deterministic.
        for (i, attachment) in attachments.into_iter().enumerate() {
            observe(SendStage::Uploading(i));
            let uploaded = match self.uploader.upload(&attachment, sender).await {
                Ok(uploaded) => uploaded,
                Err(e) => {
                    warn!(name = %attachment.name, error = %e, "attachment abandoned");
                    outcome.attachments.push(AttachmentOutcome {
                        correlation_id: attachment.id,
                        name: attachment.name,
                        result: Err(e),
                        target: None,
                    });
                    continue;
                }
            };

            observe(SendStage::Persisting(i));
            let draft = MessageDraft {
                sender_id: sender.clone(),
                receiver_id: receiver.clone(),
                listing_id: listing.cloned(),
                // Attachment-only messages carry a paperclip placeholder body.
                text: format!("\u{1F4CE} {}", attachment.name),
                formatted_html: None,
                attachment: Some(uploaded.attachment),
            };
            let result = self.store.send(&draft).await;
            if let Err(e) = &result {
                warn!(name = %attachment.name, error = %e, "attachment message not persisted");
            }
            outcome.attachments.push(AttachmentOutcome {
                correlation_id: attachment.id,
                name: attachment.name,
                result,
                target: Some(uploaded.target),
            });
        }

        if !text.is_empty() {
            observe(SendStage::PersistingText);
            let formatted = perch_format::format(text);
            let draft = MessageDraft {
                sender_id: sender.clone(),
                receiver_id: receiver.clone(),
                listing_id: listing.cloned(),
                text: formatted.text,
                formatted_html: formatted.html,
                attachment: None,
            };
            outcome.text = Some(self.store.send(&draft).await);
        }

        observe(SendStage::Done);
        debug!(
            attachments = outcome.attachments.len(),
            failed = outcome.has_failures(),
            "send pipeline finished"
        );
        Ok(outcome)
    }
}
