//! The registry of live sessions.
//!
//! All mutations take the write lock, apply the change, and emit the
//! resulting event before releasing it. Two consequences:
//!
//! - events reach the sink in the same order as the mutations, and
//! - an event is never emitted for a change a concurrent `get` cannot see.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{RegistryError, Result};
use crate::event::{EventSink, LifecycleEvent, NullSink};
use crate::session::{Session, SessionDescriptor, SessionId, SessionStats, StatsUpdate};

/// Owner of the active session set.
pub struct SessionRegistry {
    /// Live sessions indexed by id.
    sessions: RwLock<HashMap<SessionId, Session>>,
    /// Where lifecycle events go.
    sink: Arc<dyn EventSink>,
}

impl SessionRegistry {
    /// Create a registry that emits into `sink`.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            sink,
        }
    }

    /// Create a registry whose events go nowhere.
    pub fn detached() -> Self {
        Self::new(Arc::new(NullSink))
    }

    /// Start a new Live session.
    pub fn start(&self, descriptor: SessionDescriptor) -> Result<Session> {
        let missing = descriptor.missing_fields();
        if !missing.is_empty() {
            return Err(RegistryError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let now = Utc::now();
        let mut sessions = self.sessions.write();

        let mut id = SessionId::generate(now);
        while sessions.contains_key(&id) {
            id = SessionId::generate(now);
        }

        let session = Session::start(id.clone(), descriptor, now);
        sessions.insert(id, session.clone());
        self.sink.emit(LifecycleEvent::SessionStarted {
            session: session.clone(),
        });
        drop(sessions);

        info!(
            session_id = %session.id,
            channel = %session.channel_name,
            broadcaster = %session.broadcaster_id,
            "session started"
        );
        Ok(session)
    }

    /// End a session and remove it from the active set.
    ///
    /// Returns the terminal record. Of two concurrent calls for the same id,
    /// exactly one succeeds.
    pub fn end(&self, id: &str) -> Result<Session> {
        let mut sessions = self.sessions.write();
        let mut session = sessions
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound(SessionId::from(id)))?;

        let now = Utc::now();
        session.finish(now);
        self.sink.emit(LifecycleEvent::SessionEnded {
            id: session.id.clone(),
            ended_at: now,
        });
        drop(sessions);

        info!(
            session_id = %session.id,
            duration_secs = session.duration(now).num_seconds(),
            total_viewers = session.stats.total_viewers,
            "session ended"
        );
        Ok(session)
    }

    /// End every live session. Used on shutdown.
    pub fn end_all(&self) -> Vec<Session> {
        let mut sessions = self.sessions.write();
        let now = Utc::now();
        let ended: Vec<Session> = sessions
            .drain()
            .map(|(_, mut session)| {
                session.finish(now);
                self.sink.emit(LifecycleEvent::SessionEnded {
                    id: session.id.clone(),
                    ended_at: now,
                });
                session
            })
            .collect();
        drop(sessions);

        info!(count = ended.len(), "ended all sessions");
        ended
    }

    /// Replace the provided counters; omitted ones are left alone.
    pub fn update_stats(&self, id: &str, update: StatsUpdate) -> Result<Session> {
        self.modify_stats(id, |_| update)
    }

    /// Atomic read-modify-write of a session's counters.
    ///
    /// `f` sees the current counters and returns the update to apply; no
    /// other mutation can run in between.
    pub fn modify_stats<F>(&self, id: &str, f: F) -> Result<Session>
    where
        F: FnOnce(&SessionStats) -> StatsUpdate,
    {
        let mut sessions = self.sessions.write();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(SessionId::from(id)))?;

        let update = f(&session.stats);
        session.stats.apply(&update);
        let updated = session.clone();
        self.sink
            .emit(LifecycleEvent::stats_updated(updated.id.clone(), &updated.stats));
        drop(sessions);

        debug!(
            session_id = %updated.id,
            viewers = updated.stats.viewer_count,
            likes = updated.stats.likes,
            comments = updated.stats.comments,
            "session stats updated"
        );
        Ok(updated)
    }

    /// Get a live session.
    pub fn get(&self, id: &str) -> Result<Session> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(SessionId::from(id)))
    }

    /// Snapshot of all live sessions, in no particular order.
    pub fn list(&self) -> Vec<Session> {
        self.sessions.read().values().cloned().collect()
    }

    /// Number of live sessions.
    pub fn active_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Run `f` on a snapshot while holding the read lock.
    ///
    /// No mutation, and so no event, can happen until `f` returns.
    pub fn with_snapshot<R>(&self, f: impl FnOnce(Vec<Session>) -> R) -> R {
        let sessions = self.sessions.read();
        f(sessions.values().cloned().collect())
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::detached()
    }
}
