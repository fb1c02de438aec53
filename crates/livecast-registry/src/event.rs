//! Lifecycle events and the sink they are emitted into.
//!
//! On the wire every event is `{"type": <tag>, "data": <payload>}`. Readers
//! should skip tags they do not know; [`LifecycleEvent::from_json`] does that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::session::{Session, SessionId, SessionStats};

/// Wire tags this version understands.
pub const KNOWN_EVENT_TYPES: &[&str] = &[
    "active_streams",
    "stream_started",
    "stream_ended",
    "stream_stats_updated",
];

/// A session lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LifecycleEvent {
    /// Snapshot of every live session. Sent once, first, to a new observer.
    #[serde(rename = "active_streams")]
    ActiveStreams { sessions: Vec<Session> },

    /// A session went live.
    #[serde(rename = "stream_started")]
    SessionStarted { session: Session },

    /// A session ended. Observers drop it by id.
    #[serde(rename = "stream_ended", rename_all = "camelCase")]
    SessionEnded { id: SessionId, ended_at: DateTime<Utc> },

    /// Counters of a session changed.
    #[serde(rename = "stream_stats_updated", rename_all = "camelCase")]
    StatsUpdated {
        id: SessionId,
        viewer_count: u64,
        likes: u64,
        comments: u64,
    },
}

impl LifecycleEvent {
    /// Build a `StatsUpdated` event from a session's counters.
    pub fn stats_updated(id: SessionId, stats: &SessionStats) -> Self {
        Self::StatsUpdated {
            id,
            viewer_count: stats.viewer_count,
            likes: stats.likes,
            comments: stats.comments,
        }
    }

    /// The wire tag.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ActiveStreams { .. } => "active_streams",
            Self::SessionStarted { .. } => "stream_started",
            Self::SessionEnded { .. } => "stream_ended",
            Self::StatsUpdated { .. } => "stream_stats_updated",
        }
    }

    /// The session this event is about, if it is about exactly one.
    pub fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::ActiveStreams { .. } => None,
            Self::SessionStarted { session } => Some(&session.id),
            Self::SessionEnded { id, .. } => Some(id),
            Self::StatsUpdated { id, .. } => Some(id),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse an event, returning `Ok(None)` for unknown or missing tags.
    pub fn from_json(text: &str) -> serde_json::Result<Option<Self>> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        match value.get("type").and_then(serde_json::Value::as_str) {
            Some(tag) if KNOWN_EVENT_TYPES.contains(&tag) => serde_json::from_value(value).map(Some),
            _ => Ok(None),
        }
    }
}

/// Receiver of registry events.
///
/// Called while the registry holds its write lock, so events arrive in
/// mutation order. Implementations must not block and must not call back
/// into the registry.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: LifecycleEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: LifecycleEvent) {}
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: LifecycleEvent) {
        (**self).emit(event)
    }
}
