//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use livecast::{Livecast, LivecastConfig};
use livecast_registry::{LifecycleEvent, ObserverConnection, SessionDescriptor};
use livecast_token::{FixedClock, FixedSalt, SigningCredentials};

/// App id used by fixtures.
pub const TEST_APP_ID: &str = "app-id-1234";

/// App certificate used by fixtures.
pub const TEST_APP_CERTIFICATE: &str = "cert-abcdef";

/// Issue time used by fixtures: 2025-01-14T16:00:00Z.
pub const TEST_NOW: u32 = 1_736_870_400;

/// Salt used by fixtures.
pub const TEST_SALT: u32 = 0xDEAD_BEEF;

/// Credentials shared by every fixture.
pub fn test_credentials() -> SigningCredentials {
    SigningCredentials::new(TEST_APP_ID, TEST_APP_CERTIFICATE)
}

/// A service with pinned time and salt.
pub struct TestFixture {
    pub livecast: Livecast<FixedClock, FixedSalt>,
}

impl TestFixture {
    /// Create a fixture with default configuration.
    pub fn new() -> Self {
        Self::with_config(LivecastConfig::new(test_credentials()))
    }

    /// Create a fixture with custom configuration.
    ///
    /// Time and salt are still pinned to [`TEST_NOW`] and [`TEST_SALT`].
    pub fn with_config(config: LivecastConfig) -> Self {
        Self {
            livecast: Livecast::with_sources(config, FixedClock::new(TEST_NOW), FixedSalt(TEST_SALT)),
        }
    }

    /// Start `count` sessions from distinct broadcasters.
    ///
    /// Panics if any start fails.
    pub fn start_many(&self, count: usize) -> Vec<livecast::Session> {
        multi_broadcaster_descriptors(count)
            .into_iter()
            .map(|d| {
                self.livecast
                    .start(d)
                    .expect("fixture descriptors are valid")
            })
            .collect()
    }

    /// Subscribe and discard the initial snapshot.
    pub fn subscribe_past_snapshot(&self) -> ObserverConnection {
        let mut conn = self.livecast.subscribe();
        let _ = conn.try_recv();
        conn
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A minimal valid descriptor.
pub fn descriptor(broadcaster_id: &str, channel: &str) -> SessionDescriptor {
    SessionDescriptor::new(broadcaster_id, format!("{broadcaster_id} live"), channel)
        .broadcaster_name(format!("Reader {broadcaster_id}"))
        .category("tarot")
        .quality("720p")
}

/// Descriptors for `count` distinct broadcasters on distinct channels.
pub fn multi_broadcaster_descriptors(count: usize) -> Vec<SessionDescriptor> {
    (0..count)
        .map(|i| descriptor(&format!("u{i}"), &format!("ch{i}")))
        .collect()
}

/// Event type tags, in order.
pub fn event_types(events: &[std::sync::Arc<LifecycleEvent>]) -> Vec<&'static str> {
    events.iter().map(|e| e.event_type()).collect()
}
