//! Hot batch feeds and their subscriptions.
//!
//! A feed pushes whole batches to every live subscriber synchronously on the
//! publishing thread. New subscribers immediately receive the latest batch.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A batch as delivered to subscribers; cheap to clone
pub type Batch<T> = Arc<Vec<T>>;

type Sink<T> = Arc<dyn Fn(Batch<T>) + Send + Sync>;

/// Subscription ids are unique across feeds
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

struct Subscriber<T> {
    id: u64,
    active: Arc<AtomicBool>,
    sink: Sink<T>,
}

struct FeedInner<T> {
    subscribers: Mutex<Vec<Subscriber<T>>>,
    latest: Mutex<Option<Batch<T>>>,
    published: AtomicU64,
}

/// In-process source of record batches
pub struct BatchFeed<T> {
    inner: Arc<FeedInner<T>>,
}

impl<T> Clone for BatchFeed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for BatchFeed<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(FeedInner {
                subscribers: Mutex::new(Vec::new()),
                latest: Mutex::new(None),
                published: AtomicU64::new(0),
            }),
        }
    }
}

impl<T> std::fmt::Debug for BatchFeed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchFeed")
            .field("subscribers", &self.subscriber_count())
            .field("published", &self.published())
            .finish()
    }
}

impl<T: Send + Sync + 'static> BatchFeed<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a batch to every live subscriber. Returns how many received it.
    pub fn publish(&self, batch: Vec<T>) -> usize {
        let batch: Batch<T> = Arc::new(batch);
        *self
            .inner
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&batch));
        self.inner.published.fetch_add(1, Ordering::SeqCst);

        // Sinks run outside the lock so they may subscribe or cancel.
        let targets: Vec<(Arc<AtomicBool>, Sink<T>)> = {
            let mut subscribers = self
                .inner
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            subscribers.retain(|s| s.active.load(Ordering::SeqCst));
            subscribers
                .iter()
                .map(|s| (Arc::clone(&s.active), Arc::clone(&s.sink)))
                .collect()
        };

        let mut delivered = 0;
        for (active, sink) in targets {
            if active.load(Ordering::SeqCst) {
                sink(Arc::clone(&batch));
                delivered += 1;
            }
        }

        tracing::trace!(records = batch.len(), delivered, "published batch");
        delivered
    }

    /// Subscribe to batches. The latest batch, if any, is delivered before
    /// this returns.
    pub fn subscribe(&self, sink: impl Fn(Batch<T>) + Send + Sync + 'static) -> Subscription {
        let id = NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::SeqCst);
        let active = Arc::new(AtomicBool::new(true));
        let sink: Sink<T> = Arc::new(sink);

        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber {
                id,
                active: Arc::clone(&active),
                sink: Arc::clone(&sink),
            });
        tracing::debug!(subscription = id, "subscribed to feed");

        if let Some(latest) = self.latest() {
            sink(latest);
        }

        Subscription { id, active }
    }

    /// Most recently published batch
    pub fn latest(&self) -> Option<Batch<T>> {
        self.inner
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<T> BatchFeed<T> {
    /// Live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.active.load(Ordering::SeqCst))
            .count()
    }

    /// Whether `subscription` belongs to this feed and is still live
    pub fn is_subscribed(&self, subscription: &Subscription) -> bool {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|s| s.id == subscription.id && s.active.load(Ordering::SeqCst))
    }

    /// Number of batches published so far
    pub fn published(&self) -> u64 {
        self.inner.published.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SUBSCRIPTION HANDLE (Send + Sync)
// ============================================================================

/// Handle for a live subscription. Dropping it cancels the subscription.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
}

impl Subscription {
    /// Stop receiving batches. Returns `true` only for the call that actually
    /// cancelled.
    pub fn cancel(&self) -> bool {
        let cancelled = self.active.swap(false, Ordering::SeqCst);
        if cancelled {
            tracing::debug!(subscription = self.id, "unsubscribed from feed");
        }
        cancelled
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
