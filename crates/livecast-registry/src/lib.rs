//! # Livecast Registry
//!
//! In-memory registry of live broadcast sessions, and fan-out of their
//! lifecycle events to connected observers.
//!
//! ## Key Types
//!
//! - [`SessionRegistry`] - The set of Live sessions and its mutations
//! - [`Broadcaster`] - Per-observer bounded queues with evict-on-failure
//! - [`LifecycleEvent`] - `active_streams`, `stream_started`, `stream_ended`,
//!   `stream_stats_updated`
//! - [`EventSink`] - Seam between the two; the registry emits, the
//!   broadcaster fans out
//!
//! ## Ordering
//!
//! The registry emits while holding its write lock. A new observer is
//! registered via [`SessionRegistry::with_snapshot`], under the read lock, so
//! its `active_streams` snapshot and the events that follow it never overlap
//! or leave a gap.
//!
//! Lock order is registry first, then broadcaster. The broadcaster never
//! calls back into the registry.

pub mod broadcast;
pub mod error;
pub mod event;
pub mod registry;
pub mod session;

pub use broadcast::{Broadcaster, ObserverConnection, ObserverId, DEFAULT_QUEUE_CAPACITY};
pub use error::{DeliveryError, RegistryError, Result};
pub use event::{EventSink, LifecycleEvent, NullSink, KNOWN_EVENT_TYPES};
pub use registry::SessionRegistry;
pub use session::{
    Session, SessionDescriptor, SessionId, SessionStats, SessionStatus, StatsUpdate,
};
