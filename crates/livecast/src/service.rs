//! The Livecast service: token issuance plus the live session registry,
//! wired to a broadcaster.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use livecast_registry::{
    Broadcaster, EventSink, ObserverConnection, ObserverId, Session, SessionDescriptor,
    SessionRegistry, SessionStats, StatsUpdate,
};
use livecast_token::{
    CapabilityToken, Clock, RandomSalt, Role, SaltSource, SystemClock, TokenIssuer,
};

use crate::config::LivecastConfig;
use crate::error::Result;

/// Point-in-time service counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub active_sessions: usize,
    pub observers: usize,
}

/// The main service.
///
/// Provides a unified API for:
/// - Issuing capability tokens
/// - Starting, updating and ending sessions
/// - Subscribing observers to lifecycle events
pub struct Livecast<C: Clock = SystemClock, S: SaltSource = RandomSalt> {
    issuer: TokenIssuer<C, S>,
    registry: SessionRegistry,
    broadcaster: Arc<Broadcaster>,
    token_validity_secs: u32,
}

impl Livecast {
    /// Create a service backed by the wall clock and thread RNG.
    pub fn new(config: LivecastConfig) -> Self {
        Self::with_sources(config, SystemClock, RandomSalt)
    }
}

impl<C: Clock, S: SaltSource> Livecast<C, S> {
    /// Create a service with explicit time and salt sources for issuance.
    pub fn with_sources(config: LivecastConfig, clock: C, salt: S) -> Self {
        let broadcaster = Arc::new(Broadcaster::new(config.observer_queue_capacity));
        let sink: Arc<dyn EventSink> = broadcaster.clone();
        let issuer = TokenIssuer::with_sources(config.credentials, clock, salt)
            .with_policy(config.privilege_policy);

        Self {
            issuer,
            registry: SessionRegistry::new(sink),
            broadcaster,
            token_validity_secs: config.token_validity_secs,
        }
    }

    pub fn issuer(&self) -> &TokenIssuer<C, S> {
        &self.issuer
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tokens
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a token with the configured validity window and policy.
    pub fn issue_token(&self, channel: &str, subject: u32, role: Role) -> Result<CapabilityToken> {
        Ok(self
            .issuer
            .issue(channel, subject, role, self.token_validity_secs)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sessions
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a session, issuing a publisher token for its channel if the
    /// descriptor does not carry one.
    ///
    /// The token is issued with subject 0, so any uid may join with it.
    pub fn go_live(&self, mut descriptor: SessionDescriptor) -> Result<Session> {
        if descriptor.token.is_none() && descriptor.missing_fields().is_empty() {
            let token = self.issue_token(&descriptor.channel_name, 0, Role::Publisher)?;
            descriptor.token = Some(token.into_string());
        }
        self.start(descriptor)
    }

    /// Start a session exactly as described.
    pub fn start(&self, descriptor: SessionDescriptor) -> Result<Session> {
        Ok(self.registry.start(descriptor)?)
    }

    /// End a session. Returns its terminal record.
    pub fn end(&self, id: &str) -> Result<Session> {
        Ok(self.registry.end(id)?)
    }

    pub fn update_stats(&self, id: &str, update: StatsUpdate) -> Result<Session> {
        Ok(self.registry.update_stats(id, update)?)
    }

    /// Atomic read-modify-write of a session's counters.
    pub fn modify_stats<F>(&self, id: &str, f: F) -> Result<Session>
    where
        F: FnOnce(&SessionStats) -> StatsUpdate,
    {
        Ok(self.registry.modify_stats(id, f)?)
    }

    pub fn get(&self, id: &str) -> Result<Session> {
        Ok(self.registry.get(id)?)
    }

    pub fn list(&self) -> Vec<Session> {
        self.registry.list()
    }

    pub fn active_count(&self) -> usize {
        self.registry.active_count()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Observers
    // ─────────────────────────────────────────────────────────────────────────

    /// Connect an observer.
    ///
    /// Its first event is the `active_streams` snapshot; every later event
    /// applies on top of that snapshot with nothing missed.
    pub fn subscribe(&self) -> ObserverConnection {
        self.registry
            .with_snapshot(|sessions| self.broadcaster.subscribe(sessions))
    }

    /// Disconnect an observer. Returns whether it was still connected.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.broadcaster.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.broadcaster.observer_count()
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            active_sessions: self.active_count(),
            observers: self.observer_count(),
        }
    }

    /// End every session, notify observers, then disconnect them.
    pub fn shutdown(&self) -> Vec<Session> {
        let ended = self.registry.end_all();
        let observers = self.broadcaster.close_all();
        info!(sessions = ended.len(), observers, "livecast shut down");
        ended
    }
}
