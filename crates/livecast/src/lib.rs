//! # Livecast
//!
//! Capability tokens for real-time channels, and a live session registry
//! whose lifecycle events fan out to connected observers.
//!
//! ## Overview
//!
//! - **Tokens**: signed, time-bounded credentials for a channel and subject
//! - **Sessions**: server-side records of active broadcasts
//! - **Observers**: parties receiving `active_streams` once, then deltas
//!
//! ## Usage
//!
//! ```rust,no_run
//! use livecast::{Livecast, LivecastConfig, SessionDescriptor, StatsUpdate};
//!
//! async fn example() -> livecast::Result<()> {
//!     let livecast = Livecast::new(LivecastConfig::from_env());
//!
//!     let mut observer = livecast.subscribe();
//!
//!     let session = livecast.go_live(
//!         SessionDescriptor::new("u1", "Mercury Retrograde Q&A", "ch1")
//!             .category("astrology"),
//!     )?;
//!     livecast.update_stats(session.id.as_str(), StatsUpdate::viewers(42))?;
//!
//!     while let Some(event) = observer.recv().await {
//!         println!("{}", event.to_json().unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `livecast::token` - Token issuance and wire format
//! - `livecast::registry` - Sessions, events and the broadcaster

pub mod config;
pub mod error;
pub mod service;

// Re-export component crates
pub use livecast_registry as registry;
pub use livecast_token as token;

// Re-export main types for convenience
pub use config::LivecastConfig;
pub use error::{LivecastError, Result};
pub use service::{HealthReport, Livecast};

// Re-export commonly used component types
pub use livecast_registry::{
    LifecycleEvent, ObserverConnection, ObserverId, Session, SessionDescriptor, SessionId,
    SessionStats, SessionStatus, StatsUpdate,
};
pub use livecast_token::{
    CapabilityToken, PrivilegePolicy, Role, SigningCredentials, TokenIssuer,
};
