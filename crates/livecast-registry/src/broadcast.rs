//! Fan-out of lifecycle events to observers.
//!
//! Each observer owns a bounded queue. Delivery never waits: an observer
//! whose queue is full or closed is evicted on the spot, and everyone else
//! still gets the event.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::{debug, warn};

use crate::error::DeliveryError;
use crate::event::{EventSink, LifecycleEvent};
use crate::session::Session;

/// Default per-observer queue depth.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Identifies one observer connection.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObserverId({})", self.0)
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obs-{}", self.0)
    }
}

/// Receiving end handed to a subscriber.
///
/// Dropping it disconnects: the observer is removed on the next subscribe,
/// count or publish, whichever comes first.
pub struct ObserverConnection {
    id: ObserverId,
    rx: mpsc::Receiver<Arc<LifecycleEvent>>,
}

impl ObserverConnection {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Wait for the next event. `None` once the observer has been evicted
    /// or unsubscribed and its queue drained.
    pub async fn recv(&mut self) -> Option<Arc<LifecycleEvent>> {
        self.rx.recv().await
    }

    /// Take the next event if one is queued.
    pub fn try_recv(&mut self) -> Option<Arc<LifecycleEvent>> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drain every queued event.
    pub fn drain(&mut self) -> Vec<Arc<LifecycleEvent>> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

impl fmt::Debug for ObserverConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverConnection")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// The set of connected observers.
pub struct Broadcaster {
    observers: Mutex<HashMap<ObserverId, mpsc::Sender<Arc<LifecycleEvent>>>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl Broadcaster {
    /// Create a broadcaster whose observers each buffer up to `capacity`
    /// events. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            observers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Register an observer.
    ///
    /// `snapshot` is queued as an `ActiveStreams` event before the observer
    /// becomes visible to [`Broadcaster::publish`], so it is always the first
    /// thing the observer receives.
    pub fn subscribe(&self, snapshot: Vec<Session>) -> ObserverConnection {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.capacity);

        let active = snapshot.len();
        // A fresh queue has at least one free slot.
        let _ = tx.try_send(Arc::new(LifecycleEvent::ActiveStreams { sessions: snapshot }));

        let mut observers = self.observers.lock();
        prune_closed(&mut observers);
        observers.insert(id, tx);
        let count = observers.len();
        drop(observers);

        debug!(observer = %id, active, observers = count, "observer subscribed");
        ObserverConnection { id, rx }
    }

    /// Remove an observer. Returns whether it was still registered.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let removed = self.observers.lock().remove(&id).is_some();
        if removed {
            debug!(observer = %id, "observer unsubscribed");
        }
        removed
    }

    /// Deliver `event` to every observer, evicting the ones that cannot take
    /// it. Returns the number of observers that received it.
    pub fn publish(&self, event: LifecycleEvent) -> usize {
        let event = Arc::new(event);
        let mut observers = self.observers.lock();
        let mut delivered = 0;

        observers.retain(|id, tx| match deliver(tx, &event) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(err) => {
                warn!(
                    observer = %id,
                    event = event.event_type(),
                    error = %err,
                    "evicting observer"
                );
                false
            }
        });

        delivered
    }

    /// Number of connected observers. Observers that dropped their
    /// connection are removed first.
    pub fn observer_count(&self) -> usize {
        let mut observers = self.observers.lock();
        prune_closed(&mut observers);
        observers.len()
    }

    /// Drop every observer. Their connections see end-of-stream once drained.
    pub fn close_all(&self) -> usize {
        let mut observers = self.observers.lock();
        let closed = observers.len();
        observers.clear();
        closed
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("observers", &self.observer_count())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl EventSink for Broadcaster {
    fn emit(&self, event: LifecycleEvent) {
        self.publish(event);
    }
}

fn prune_closed(observers: &mut HashMap<ObserverId, mpsc::Sender<Arc<LifecycleEvent>>>) {
    observers.retain(|id, tx| {
        let open = !tx.is_closed();
        if !open {
            debug!(observer = %id, "observer disconnected");
        }
        open
    });
}

fn deliver(
    tx: &mpsc::Sender<Arc<LifecycleEvent>>,
    event: &Arc<LifecycleEvent>,
) -> std::result::Result<(), DeliveryError> {
    tx.try_send(Arc::clone(event)).map_err(|err| match err {
        TrySendError::Full(_) => DeliveryError::QueueFull,
        TrySendError::Closed(_) => DeliveryError::Disconnected,
    })
}
