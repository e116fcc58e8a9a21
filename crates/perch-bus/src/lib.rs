// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Topic-scoped publish/subscribe bus.
//!
//! The only shared resource across independently-mounted views is the
//! session cache, and this bus is its coherence mechanism: a write is
//! followed by a synchronous publish so every mounted view converges
//! without re-fetching. Topics are plain strings; conversation-scoped
//! consumers use [`ThreadKey::topic`]-style names so a handler for one
//! thread can never observe another thread's events.
//!
//! Every `subscribe` returns a [`Subscription`] guard. Dropping the guard
//! unsubscribes synchronously, which is what makes teardown leak-free.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct BusState<T> {
    next_id: u64,
    topics: HashMap<String, Vec<(u64, Handler<T>)>>,
}

/// A synchronous, in-process event bus carrying values of one event type.
///
/// Cloning is cheap; clones share the same subscriber registry. Publishing
/// invokes every handler subscribed to the topic, in subscription order, on
/// the publisher's call stack.
pub struct EventBus<T> {
    state: Arc<Mutex<BusState<T>>>,
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventBus<T> {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BusState {
                next_id: 0,
                topics: HashMap::new(),
            })),
        }
    }

    /// Register `handler` for `topic`. Delivery stops the moment the
    /// returned guard is dropped.
    pub fn subscribe(
        &self,
        topic: &str,
        handler: impl Fn(&T) + Send + Sync + 'static,
    ) -> Subscription<T> {
        let mut state = self.state.lock().expect("bus lock poisoned");
        let id = state.next_id;
        state.next_id += 1;
        state
            .topics
            .entry(topic.to_string())
            .or_default()
            .push((id, Arc::new(handler)));
        debug!(topic, id, "bus subscription added");
        Subscription {
            state: Arc::downgrade(&self.state),
            topic: topic.to_string(),
            id,
        }
    }

    /// Deliver `event` to every current subscriber of `topic`.
    pub fn publish(&self, topic: &str, event: &T) {
        // Snapshot the handler list so a handler that subscribes or drops a
        // guard during delivery does not deadlock on the registry lock.
        let handlers: Vec<Handler<T>> = {
            let state = self.state.lock().expect("bus lock poisoned");
            match state.topics.get(topic) {
                Some(entries) => entries.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return,
            }
        };
        for handler in handlers {
            handler(event);
        }
    }

    /// Number of live subscriptions on `topic`. Test and debugging aid.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        let state = self.state.lock().expect("bus lock poisoned");
        state.topics.get(topic).map_or(0, Vec::len)
    }
}

fn remove_subscriber<T>(state: &Mutex<BusState<T>>, topic: &str, id: u64) {
    let mut state = state.lock().expect("bus lock poisoned");
    let emptied = match state.topics.get_mut(topic) {
        Some(entries) => {
            entries.retain(|(entry_id, _)| *entry_id != id);
            entries.is_empty()
        }
        None => false,
    };
    if emptied {
        state.topics.remove(topic);
    }
}

/// Guard for one bus subscription; dropping it unsubscribes synchronously.
#[must_use = "dropping the guard immediately unsubscribes"]
pub struct Subscription<T> {
    state: Weak<Mutex<BusState<T>>>,
    topic: String,
    id: u64,
}

impl<T> Subscription<T> {
    /// Explicit teardown; equivalent to dropping the guard.
    pub fn unsubscribe(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            remove_subscriber(&state, &self.topic, self.id);
            debug!(topic = %self.topic, id = self.id, "bus subscription removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn publish_reaches_only_the_subscribed_topic() {
        let bus: EventBus<String> = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        let _sub = bus.subscribe("dm:direct:bob", move |event| {
            seen_clone.lock().unwrap().push(event.clone());
        });

        bus.publish("dm:direct:bob", &"hello".to_string());
        bus.publish("dm:direct:carol", &"other thread".to_string());

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec!["hello".to_string()]);
    }

    #[test]
    fn dropping_the_guard_stops_delivery() {
        let bus: EventBus<u32> = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let count_clone = Arc::clone(&count);
        let sub = bus.subscribe("t", move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish("t", &1);
        drop(sub);
        bus.publish("t", &2);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count("t"), 0);
    }

    #[test]
    fn multiple_subscribers_all_receive() {
        let bus: EventBus<u32> = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let subs: Vec<_> = (0..3)
            .map(|_| {
                let count = Arc::clone(&count);
                bus.subscribe("t", move |_| {
                    count.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        bus.publish("t", &7);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        drop(subs);
    }

    #[test]
    fn handler_may_drop_another_guard_during_delivery() {
        let bus: EventBus<u32> = EventBus::new();
        let other = Arc::new(Mutex::new(Some(bus.subscribe("t", |_| {}))));

        let other_clone = Arc::clone(&other);
        let _sub = bus.subscribe("t", move |_| {
            other_clone.lock().unwrap().take();
        });

        // Must not deadlock on the registry lock.
        bus.publish("t", &1);
        assert_eq!(bus.subscriber_count("t"), 1);
    }

    #[test]
    fn publish_to_empty_topic_is_a_noop() {
        let bus: EventBus<u32> = EventBus::new();
        bus.publish("nobody-home", &1);
    }
}
