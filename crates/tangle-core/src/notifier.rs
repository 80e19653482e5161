//! Generic in-process publish/subscribe primitive.
//!
//! Each subscriber owns an independent bounded queue; publishing clones the
//! value into every live queue. A subscriber that stays full past the
//! configured timeout is disconnected rather than allowed to stall the
//! producer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tracing::warn;

/// The only tunables the notification core consumes.
#[derive(Debug, Clone, Copy)]
pub struct NotifierConfig {
    /// Per-subscriber queue capacity.
    pub buffer_size: usize,
    /// How long a publish may wait on one full subscriber queue before that
    /// subscriber is disconnected.
    pub publish_timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            buffer_size: 256,
            publish_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotifierError {
    #[error("notifier is closed")]
    Closed,
}

struct Shared<T> {
    config: NotifierConfig,
    next_id: AtomicU64,
    closed: AtomicBool,
    subscribers: DashMap<u64, mpsc::Sender<T>>,
}

pub struct Notifier<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Notifier<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Handle to a live subscription. Values published while the handle is alive
/// arrive in publish order; dropping (or consuming via
/// [`Subscription::unsubscribe`]) stops delivery immediately and releases the
/// queue.
pub struct Subscription<T> {
    id: u64,
    receiver: mpsc::Receiver<T>,
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send + 'static> Notifier<T> {
    pub fn new(mut config: NotifierConfig) -> Self {
        // A zero-capacity queue would make mpsc::channel panic on subscribe;
        // treat it as the smallest usable queue instead.
        config.buffer_size = config.buffer_size.max(1);
        Self {
            shared: Arc::new(Shared {
                config,
                next_id: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                subscribers: DashMap::new(),
            }),
        }
    }

    /// Register a new subscriber. It receives every value published after
    /// this call, not a replay of history.
    pub fn subscribe(&self) -> Result<Subscription<T>, NotifierError> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(NotifierError::Closed);
        }
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(self.shared.config.buffer_size);
        self.shared.subscribers.insert(id, sender);
        // close() may have cleared the table between the flag check and the
        // insert; back the registration out if so.
        if self.shared.closed.load(Ordering::Acquire) {
            self.shared.subscribers.remove(&id);
            return Err(NotifierError::Closed);
        }
        Ok(Subscription {
            id,
            receiver,
            shared: Arc::clone(&self.shared),
        })
    }

    /// Deliver `value` to every currently-subscribed handle, returning how
    /// many subscribers received it. Zero subscribers is a silent no-op.
    ///
    /// A subscriber error never fails the publish: a queue full past
    /// `publish_timeout` disconnects that subscriber, and a handle dropped
    /// mid-publish is skipped.
    pub async fn publish(&self, value: T) -> Result<usize, NotifierError> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(NotifierError::Closed);
        }
        // Snapshot the senders first: holding dashmap guards across await
        // points would block concurrent subscribe/unsubscribe.
        let targets: Vec<(u64, mpsc::Sender<T>)> = self
            .shared
            .subscribers
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        let mut delivered = 0;
        for (id, sender) in targets {
            match sender
                .send_timeout(value.clone(), self.shared.config.publish_timeout)
                .await
            {
                Ok(()) => delivered += 1,
                Err(SendTimeoutError::Timeout(_)) => {
                    warn!(subscriber = id, "subscriber queue full past publish timeout, disconnecting");
                    self.shared.subscribers.remove(&id);
                }
                Err(SendTimeoutError::Closed(_)) => {
                    // Unsubscribed while the publish was in flight.
                    self.shared.subscribers.remove(&id);
                }
            }
        }
        Ok(delivered)
    }

    /// Tear down: disconnect all subscribers and fail subsequent
    /// subscribe/publish calls with [`NotifierError::Closed`].
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::Release);
        self.shared.subscribers.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.len()
    }
}

impl<T> Subscription<T> {
    /// Wait for the next published value. Returns `None` once the
    /// subscription is disconnected (notifier closed, or this subscriber was
    /// dropped for falling too far behind) and the queue has drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Explicit unsubscribe. Equivalent to dropping the handle; safe against
    /// a concurrent in-flight publish, which will simply skip this
    /// subscriber.
    pub fn unsubscribe(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.shared.subscribers.remove(&self.id);
    }
}
