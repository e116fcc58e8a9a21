// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation controller: one mounted thread view.
//!
//! Owns the active thread's log exclusively, hydrates history with a
//! generation guard (a response for a previously-selected thread is
//! discarded), tears down the previous live subscription before attaching
//! the next one, and refuses overlapping sends for the same draft.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use perch_attach::{FileInput, PendingAttachment, Selection, Uploader, select_files};
use perch_config::PerchConfig;
use perch_core::{
    Message, MessageRepository, ObjectStore, PerchError, PushChannel, ThreadKey, UserId,
};
use perch_store::MessageStore;
use perch_sync::{ConversationLog, SyncEngine, SyncSubscription};

use crate::composer::{SendOutcome, SendPipeline, SendStage};

struct ViewState {
    generation: u64,
    active: Option<ThreadKey>,
    log: Arc<Mutex<ConversationLog>>,
    subscription: Option<SyncSubscription>,
    pending: Vec<PendingAttachment>,
    loading: bool,
}

impl ViewState {
    fn new() -> Self {
        Self {
            generation: 0,
            active: None,
            log: Arc::new(Mutex::new(ConversationLog::new())),
            subscription: None,
            pending: Vec::new(),
            loading: false,
        }
    }
}

/// One user's messaging surface: thread selection, live sync, composing.
pub struct Conversation<R, C> {
    viewer: UserId,
    store: MessageStore<R>,
    engine: SyncEngine<C>,
    uploader: Uploader,
    limits: perch_config::model::LimitsConfig,
    state: Mutex<ViewState>,
    send_in_flight: AtomicBool,
}

impl<R, C> Conversation<R, C>
where
    R: MessageRepository,
    C: PushChannel + 'static,
{
    pub fn new(
        viewer: UserId,
        repo: Arc<R>,
        channel: Arc<C>,
        objects: Arc<dyn ObjectStore>,
        config: &PerchConfig,
    ) -> Self {
        Self {
            viewer,
            store: MessageStore::new(repo),
            engine: SyncEngine::new(channel),
            uploader: Uploader::new(objects, config.storage.clone()),
            limits: config.limits.clone(),
            state: Mutex::new(ViewState::new()),
            send_in_flight: AtomicBool::new(false),
        }
    }

    /// Select `key` as the active thread: tear down the previous live
    /// subscription, attach a fresh one, then hydrate history.
    ///
    /// `on_message` fires for every live event accepted into this thread's
    /// log. Returns the hydrated history snapshot; if another `open` won
    /// the race while history was in flight, the stale response is
    /// discarded and an empty snapshot returned.
    pub async fn open(
        &self,
        key: ThreadKey,
        on_message: impl Fn(&Message) + Send + Sync + 'static,
    ) -> Result<Vec<Message>, PerchError> {
        let (generation, log) = {
            let mut state = self.state.lock().await;
            state.generation += 1;

            // Previous thread's subscription must be gone before the new
            // one attaches; its log is abandoned with it.
            state.subscription = None;
            state.log = Arc::new(Mutex::new(ConversationLog::new()));
            state.active = Some(key.clone());
            state.loading = true;

            let subscription = self.engine.subscribe(
                self.viewer.clone(),
                key.counterpart.clone(),
                Arc::clone(&state.log),
                on_message,
            );
            state.subscription = Some(subscription);
            (state.generation, Arc::clone(&state.log))
        };

        let limit = if key.listing.is_some() {
            self.limits.listing_history_limit
        } else {
            self.limits.direct_history_limit
        };
        let fetched = self
            .store
            .fetch_history(&self.viewer, &key.counterpart, key.listing.as_ref(), limit)
            .await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            // The user switched threads while this fetch was in flight.
            debug!(topic = %key.topic(), "stale history response discarded");
            return Ok(Vec::new());
        }

        let fetched = fetched?;
        log.lock().await.hydrate(fetched);
        state.loading = false;

        let snapshot = log.lock().await.messages().to_vec();
        debug!(topic = %key.topic(), count = snapshot.len(), "thread hydrated");
        Ok(snapshot)
    }

    /// Tear down the active thread view and its subscription.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        state.subscription = None;
        state.active = None;
        state.loading = false;
        state.log = Arc::new(Mutex::new(ConversationLog::new()));
        state.pending.clear();
    }

    /// True while history for the active thread is still in flight; the
    /// view renders a skeleton state meanwhile.
    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    /// Snapshot of the rendered messages, display order.
    pub async fn messages(&self) -> Vec<Message> {
        let log = {
            let state = self.state.lock().await;
            Arc::clone(&state.log)
        };
        let log = log.lock().await;
        log.messages().to_vec()
    }

    /// Validate a selection batch against the limits and what is already
    /// queued; accepted files join the pending queue.
    pub async fn attach_files(&self, files: Vec<FileInput>) -> Selection {
        let mut state = self.state.lock().await;
        let selection = select_files(files, state.pending.len(), &self.limits).await;
        state
            .pending
            .extend(selection.accepted.iter().cloned());
        selection
    }

    /// Remove a queued attachment before send, by correlation id.
    pub async fn remove_attachment(&self, id: uuid::Uuid) {
        let mut state = self.state.lock().await;
        state.pending.retain(|a| a.id != id);
    }

    /// Names of the attachments currently queued for the draft.
    pub async fn pending_attachments(&self) -> Vec<(uuid::Uuid, String)> {
        let state = self.state.lock().await;
        state
            .pending
            .iter()
            .map(|a| (a.id, a.name.clone()))
            .collect()
    }

    /// Send the current draft through the sequential pipeline.
    ///
    /// Refused with [`PerchError::SendInFlight`] while a previous send for
    /// this conversation is still outstanding. Persisted messages are
    /// inserted into the local log immediately; the push echo later dedups
    /// against them.
    pub async fn send(&self, text: &str) -> Result<SendOutcome, PerchError> {
        self.send_with_progress(text, |_| {}).await
    }

    /// [`Conversation::send`] with a pipeline stage observer.
    pub async fn send_with_progress(
        &self,
        text: &str,
        observe: impl Fn(SendStage),
    ) -> Result<SendOutcome, PerchError> {
        if self
            .send_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PerchError::SendInFlight);
        }
        let result = self.run_send(text, observe).await;
        self.send_in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn run_send(
        &self,
        text: &str,
        observe: impl Fn(SendStage),
    ) -> Result<SendOutcome, PerchError> {
        let (key, log, attachments) = {
            let mut state = self.state.lock().await;
            let key = state
                .active
                .clone()
                .ok_or_else(|| PerchError::Internal("no active thread to send into".into()))?;
            let attachments = std::mem::take(&mut state.pending);
            (key, Arc::clone(&state.log), attachments)
        };

        let pipeline = SendPipeline::new(&self.store, &self.uploader);
        let outcome = match pipeline
            .run(
                &self.viewer,
                &key.counterpart,
                key.listing.as_ref(),
                text,
                attachments,
                observe,
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "send pipeline rejected the draft");
                return Err(e);
            }
        };

        // Optimistic local state: render what persisted without waiting for
        // the echo. The log's dedup makes the echo a no-op later.
        {
            let mut log = log.lock().await;
            for message in outcome.persisted() {
                log.insert(message.clone());
            }
        }

        Ok(outcome)
    }
}
