use super::types::DeviceOrientation;
use futures::Stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, trace};

struct TrackerInner {
    sender: watch::Sender<DeviceOrientation>,
    subscribers: Arc<AtomicUsize>,
}

/// Publishes device orientation changes with latest-value semantics.
///
/// Slow subscribers never apply back-pressure: they only ever see the most
/// recent orientation, and intermediate values may be skipped.
#[derive(Clone)]
pub struct OrientationTracker {
    inner: Arc<TrackerInner>,
}

impl OrientationTracker {
    pub fn new(initial: DeviceOrientation) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            inner: Arc::new(TrackerInner {
                sender,
                subscribers: Arc::new(AtomicUsize::new(0)),
            }),
        }
    }

    pub fn current(&self) -> DeviceOrientation {
        *self.inner.sender.borrow()
    }

    /// Record a new orientation from the sensor. Repeats are swallowed.
    pub fn report(&self, orientation: DeviceOrientation) -> bool {
        let changed = self.inner.sender.send_if_modified(|current| {
            if *current == orientation {
                false
            } else {
                *current = orientation;
                true
            }
        });

        if changed {
            trace!("Device orientation changed to {:?}", orientation);
        }
        changed
    }

    /// Start observing; the subscription is released when dropped
    pub fn subscribe(&self) -> OrientationSubscription {
        let count = self.inner.subscribers.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Orientation subscriber added ({} active)", count);

        OrientationSubscription {
            receiver: self.inner.sender.subscribe(),
            subscribers: Arc::clone(&self.inner.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.load(Ordering::SeqCst)
    }
}

impl Default for OrientationTracker {
    fn default() -> Self {
        Self::new(DeviceOrientation::Portrait)
    }
}

/// Live handle on the orientation sequence
pub struct OrientationSubscription {
    receiver: watch::Receiver<DeviceOrientation>,
    subscribers: Arc<AtomicUsize>,
}

impl OrientationSubscription {
    /// Orientation at the time of the call
    pub fn current(&self) -> DeviceOrientation {
        *self.receiver.borrow()
    }

    /// Wait for the next change. `None` once the tracker is gone.
    pub async fn changed(&mut self) -> Option<DeviceOrientation> {
        self.receiver.changed().await.ok()?;
        Some(*self.receiver.borrow_and_update())
    }

    /// Lazy, infinite sequence of changes; ends only if the tracker is dropped
    pub fn into_stream(self) -> impl Stream<Item = DeviceOrientation> + Send + 'static {
        async_stream::stream! {
            let mut subscription = self;
            while let Some(orientation) = subscription.changed().await {
                yield orientation;
            }
        }
    }

    /// Explicitly end the subscription
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for OrientationSubscription {
    fn drop(&mut self) {
        let remaining = self.subscribers.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!("Orientation subscriber released ({} active)", remaining);
    }
}
