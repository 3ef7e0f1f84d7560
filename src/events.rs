//! Event/Stats Surface: synchronous, fire-and-forget pub/sub for server
//! lifecycle and traffic events, consolidated into one typed bus shared by
//! the server engine.
//!
//! Subscribers are plain closures; a panicking subscriber is caught and
//! logged so it can never disrupt request processing.

use crate::error::JsonRpcError;
use crate::protocol::{Request, Response};
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;

/// One observable moment in the server's lifecycle.
#[derive(Debug, Clone)]
pub enum Event {
    Listening,
    Request { request: Request, client_addr: String },
    Response { response: Response, client_addr: String },
    ClientActivity { address: String, when: String },
    Error { error: JsonRpcError },
}

type Subscriber = Box<dyn Fn(&Event) + Send + Sync>;

/// A synchronous pub/sub bus. Cloning is shallow — clones share the same
/// subscriber list, matching the single-bus-per-server model.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, subscriber: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.subscribers.lock().expect("event bus mutex poisoned").push(Box::new(subscriber));
    }

    /// Deliver `event` to every subscriber. A subscriber that panics is
    /// caught and logged via the `log` facade; it never propagates and never
    /// prevents later subscribers from running.
    pub fn publish(&self, event: Event) {
        let subscribers = self.subscribers.lock().expect("event bus mutex poisoned");
        for subscriber in subscribers.iter() {
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| subscriber(&event)));
            if outcome.is_err() {
                log::error!("event subscriber panicked while handling {event:?}");
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.subscribers.lock().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("EventBus").field("subscriber_count", &count).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn publish_reaches_all_subscribers() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c1 = count.clone();
        let c2 = count.clone();
        bus.subscribe(move |_event| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        bus.subscribe(move |_event| {
            c2.fetch_add(1, Ordering::SeqCst);
        });
        bus.publish(Event::Listening);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn a_panicking_subscriber_does_not_stop_later_subscribers() {
        let bus = EventBus::new();
        let reached = Arc::new(AtomicUsize::new(0));
        let reached_clone = reached.clone();
        bus.subscribe(|_event| panic!("subscriber exploded"));
        bus.subscribe(move |_event| {
            reached_clone.fetch_add(1, Ordering::SeqCst);
        });

        let previous_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));
        bus.publish(Event::Listening);
        std::panic::set_hook(previous_hook);

        assert_eq!(reached.load(Ordering::SeqCst), 1);
    }
}
