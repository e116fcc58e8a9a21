// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock push channel with injectable insert events.
//!
//! Tests inject messages (for any conversation, matching the transport's
//! superset delivery) and consumers block on `recv` exactly like the real
//! websocket channel.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use perch_core::{Message, PerchError, PushChannel};

/// A mock insert-event stream for testing.
#[derive(Clone)]
pub struct MockPushChannel {
    inbound: Arc<Mutex<VecDeque<Message>>>,
    notify: Arc<Notify>,
}

impl MockPushChannel {
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Inject an insert event. The next `recv` call returns it.
    pub async fn inject(&self, message: Message) {
        self.inbound.lock().await.push_back(message);
        self.notify.notify_one();
    }

    /// Number of injected events not yet consumed.
    pub async fn pending(&self) -> usize {
        self.inbound.lock().await.len()
    }
}

impl Default for MockPushChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushChannel for MockPushChannel {
    async fn recv(&self) -> Result<Message, PerchError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Ok(msg);
                }
            }
            // Wait until a new event is injected.
            self.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use perch_core::{MessageId, UserId};

    fn message(id: &str) -> Message {
        Message {
            id: MessageId(id.into()),
            sender_id: UserId("a".into()),
            receiver_id: UserId("b".into()),
            listing_id: None,
            text: "hi".into(),
            formatted_html: None,
            attachment: None,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn injected_events_are_received_in_order() {
        let channel = MockPushChannel::new();
        channel.inject(message("m1")).await;
        channel.inject(message("m2")).await;

        assert_eq!(channel.recv().await.unwrap().id.0, "m1");
        assert_eq!(channel.recv().await.unwrap().id.0, "m2");
        assert_eq!(channel.pending().await, 0);
    }

    #[tokio::test]
    async fn recv_waits_for_late_injection() {
        let channel = MockPushChannel::new();
        let receiver = channel.clone();

        let handle = tokio::spawn(async move { receiver.recv().await });
        tokio::task::yield_now().await;
        channel.inject(message("late")).await;

        let received = handle.await.unwrap().unwrap();
        assert_eq!(received.id.0, "late");
    }
}
