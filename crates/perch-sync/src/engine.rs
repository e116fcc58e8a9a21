// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Real-time sync engine.
//!
//! Attaches one conversation's log to the push channel: events are filtered
//! to the active pair (the transport may deliver a superset), deduplicated
//! through the log, and accepted messages forwarded to the sink. Dropping
//! the returned guard tears the subscription down synchronously.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use perch_core::{Message, PushChannel, UserId};

use crate::log::ConversationLog;

/// Guard for one live conversation subscription.
///
/// Dropping it aborts the receive task immediately. A stale subscription
/// can never append into another thread's list: each subscription writes
/// only to the log it was created with.
#[must_use = "dropping the guard immediately unsubscribes"]
pub struct SyncSubscription {
    handle: JoinHandle<()>,
}

impl SyncSubscription {
    /// Explicit teardown; equivalent to dropping the guard.
    pub fn unsubscribe(self) {}
}

impl Drop for SyncSubscription {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("sync subscription torn down");
    }
}

/// Subscribes conversation views to the push channel.
pub struct SyncEngine<C> {
    channel: Arc<C>,
}

impl<C: PushChannel + 'static> SyncEngine<C> {
    pub fn new(channel: Arc<C>) -> Self {
        Self { channel }
    }

    /// Attach `log` to the live stream for the (`viewer`, `other`)
    /// conversation. `on_message` fires for each event that survived the
    /// pair filter and the dedup check.
    pub fn subscribe(
        &self,
        viewer: UserId,
        other: UserId,
        log: Arc<Mutex<ConversationLog>>,
        on_message: impl Fn(&Message) + Send + Sync + 'static,
    ) -> SyncSubscription {
        let channel = Arc::clone(&self.channel);

        let handle = tokio::spawn(async move {
            loop {
                let message = match channel.recv().await {
                    Ok(message) => message,
                    Err(e) => {
                        warn!(error = %e, "push channel receive failed, stopping subscription");
                        break;
                    }
                };

                // The transport may deliver events for conversations this
                // view never asked about.
                if !message.involves_pair(&viewer, &other) {
                    debug!(id = %message.id.0, "ignoring event for another conversation");
                    continue;
                }

                let inserted = log.lock().await.insert(message.clone());
                if inserted {
                    on_message(&message);
                } else {
                    debug!(id = %message.id.0, "duplicate event discarded");
                }
            }
        });

        SyncSubscription { handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use perch_core::MessageId;
    use perch_test_utils::MockPushChannel;

    fn message(id: &str, sender: &str, receiver: &str, offset_secs: i64) -> Message {
        let base = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        Message {
            id: MessageId(id.into()),
            sender_id: UserId(sender.into()),
            receiver_id: UserId(receiver.into()),
            listing_id: None,
            text: id.into(),
            formatted_html: None,
            attachment: None,
            read_at: None,
            created_at: base + chrono::Duration::seconds(offset_secs),
        }
    }

    async fn wait_for_len(log: &Arc<Mutex<ConversationLog>>, len: usize) {
        for _ in 0..100 {
            if log.lock().await.len() == len {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("log never reached {len} messages");
    }

    #[tokio::test]
    async fn events_for_the_active_pair_are_appended() {
        let channel = Arc::new(MockPushChannel::new());
        let engine = SyncEngine::new(Arc::clone(&channel));
        let log = Arc::new(Mutex::new(ConversationLog::new()));

        let received = Arc::new(AtomicUsize::new(0));
        let received_clone = Arc::clone(&received);
        let _sub = engine.subscribe(
            UserId("alice".into()),
            UserId("bob".into()),
            Arc::clone(&log),
            move |_| {
                received_clone.fetch_add(1, Ordering::SeqCst);
            },
        );

        channel.inject(message("m1", "bob", "alice", 0)).await;
        channel.inject(message("m2", "alice", "bob", 1)).await;

        wait_for_len(&log, 2).await;
        assert_eq!(received.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn superset_events_are_filtered_at_the_edge() {
        let channel = Arc::new(MockPushChannel::new());
        let engine = SyncEngine::new(Arc::clone(&channel));
        let log = Arc::new(Mutex::new(ConversationLog::new()));

        let _sub = engine.subscribe(
            UserId("alice".into()),
            UserId("bob".into()),
            Arc::clone(&log),
            |_| {},
        );

        // An event for a conversation this view did not request.
        channel.inject(message("mx", "carol", "dave", 0)).await;
        channel.inject(message("m1", "bob", "alice", 1)).await;

        wait_for_len(&log, 1).await;
        let log = log.lock().await;
        assert_eq!(log.messages()[0].id.0, "m1");
        assert!(!log.contains(&MessageId("mx".into())));
    }

    #[tokio::test]
    async fn duplicate_events_do_not_grow_the_log_or_fire_the_sink() {
        let channel = Arc::new(MockPushChannel::new());
        let engine = SyncEngine::new(Arc::clone(&channel));
        let log = Arc::new(Mutex::new(ConversationLog::new()));

        // The fetch already rendered m1; the push echo must be a no-op.
        log.lock().await.insert(message("m1", "bob", "alice", 0));

        let received = Arc::new(AtomicUsize::new(0));
        let received_clone = Arc::clone(&received);
        let _sub = engine.subscribe(
            UserId("alice".into()),
            UserId("bob".into()),
            Arc::clone(&log),
            move |_| {
                received_clone.fetch_add(1, Ordering::SeqCst);
            },
        );

        channel.inject(message("m1", "bob", "alice", 0)).await;
        channel.inject(message("m2", "bob", "alice", 1)).await;

        wait_for_len(&log, 2).await;
        assert_eq!(received.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn out_of_order_push_is_resorted_for_display() {
        let channel = Arc::new(MockPushChannel::new());
        let engine = SyncEngine::new(Arc::clone(&channel));
        let log = Arc::new(Mutex::new(ConversationLog::new()));

        let _sub = engine.subscribe(
            UserId("alice".into()),
            UserId("bob".into()),
            Arc::clone(&log),
            |_| {},
        );

        channel.inject(message("late", "bob", "alice", 10)).await;
        channel.inject(message("early", "bob", "alice", 1)).await;

        wait_for_len(&log, 2).await;
        let log = log.lock().await;
        let ids: Vec<&str> = log.messages().iter().map(|m| m.id.0.as_str()).collect();
        assert_eq!(ids, ["early", "late"]);
    }

    #[tokio::test]
    async fn dropped_subscription_never_touches_a_new_thread() {
        let channel = Arc::new(MockPushChannel::new());
        let engine = SyncEngine::new(Arc::clone(&channel));

        let old_log = Arc::new(Mutex::new(ConversationLog::new()));
        let sub = engine.subscribe(
            UserId("alice".into()),
            UserId("bob".into()),
            Arc::clone(&old_log),
            |_| {},
        );
        sub.unsubscribe();

        // The replacement thread view.
        let new_log = Arc::new(Mutex::new(ConversationLog::new()));
        let _sub = engine.subscribe(
            UserId("alice".into()),
            UserId("carol".into()),
            Arc::clone(&new_log),
            |_| {},
        );

        // An event for the old conversation arrives after the switch.
        channel.inject(message("stale", "bob", "alice", 0)).await;
        channel.inject(message("fresh", "carol", "alice", 1)).await;

        wait_for_len(&new_log, 1).await;
        assert_eq!(new_log.lock().await.messages()[0].id.0, "fresh");
        assert!(old_log.lock().await.is_empty());
    }
}
