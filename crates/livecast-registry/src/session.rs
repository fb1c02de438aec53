//! Session: the server-side record of one live broadcast.
//!
//! A session is created Live and ends exactly once. Ended sessions leave the
//! registry immediately; only the terminal copy returned by `end` survives.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Characters used in the random part of a session id.
const ID_SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of the random part of a session id.
const ID_SUFFIX_LEN: usize = 9;

/// Server-generated session identifier: `stream_<unix millis>_<9 random chars>`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh id stamped with `now`.
    ///
    /// Uniqueness across the process lifetime is probabilistic: two ids can
    /// only collide if they share a millisecond and all 9 random characters
    /// (1 in 36^9). The registry additionally regenerates on a clash with a
    /// live id; ended ids are not tracked.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| ID_SUFFIX_CHARSET[rng.gen_range(0..ID_SUFFIX_CHARSET.len())] as char)
            .collect();
        Self(format!("stream_{}_{}", now.timestamp_millis(), suffix))
    }

    /// Wrap an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Broadcasting.
    Live,
    /// Finished. Terminal.
    Ended,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Live counters of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Viewers watching right now.
    pub viewer_count: u64,
    /// Cumulative viewers: grows by every increase of `viewer_count`.
    pub total_viewers: u64,
    pub likes: u64,
    pub comments: u64,
}

impl SessionStats {
    /// Apply a partial update. Provided fields replace; omitted fields stay.
    pub fn apply(&mut self, update: &StatsUpdate) {
        if let Some(viewers) = update.viewer_count {
            if viewers > self.viewer_count {
                self.total_viewers = self.total_viewers.saturating_add(viewers - self.viewer_count);
            }
            self.viewer_count = viewers;
        }
        if let Some(likes) = update.likes {
            self.likes = likes;
        }
        if let Some(comments) = update.comments {
            self.comments = comments;
        }
    }
}

/// A partial stats update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsUpdate {
    pub viewer_count: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
}

impl StatsUpdate {
    pub fn viewers(count: u64) -> Self {
        Self {
            viewer_count: Some(count),
            ..Self::default()
        }
    }

    pub fn likes(count: u64) -> Self {
        Self {
            likes: Some(count),
            ..Self::default()
        }
    }

    pub fn comments(count: u64) -> Self {
        Self {
            comments: Some(count),
            ..Self::default()
        }
    }

    /// Check if the update touches nothing.
    pub fn is_empty(&self) -> bool {
        self.viewer_count.is_none() && self.likes.is_none() && self.comments.is_none()
    }
}

/// Caller-supplied description of a session to start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionDescriptor {
    pub broadcaster_id: String,
    pub broadcaster_name: String,
    pub broadcaster_avatar: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub quality: String,
    pub is_private: bool,
    pub tags: Vec<String>,
    pub channel_name: String,
    pub token: Option<String>,
}

impl SessionDescriptor {
    /// Create a descriptor with the three required fields.
    pub fn new(
        broadcaster_id: impl Into<String>,
        title: impl Into<String>,
        channel_name: impl Into<String>,
    ) -> Self {
        Self {
            broadcaster_id: broadcaster_id.into(),
            title: title.into(),
            channel_name: channel_name.into(),
            ..Self::default()
        }
    }

    pub fn broadcaster_name(mut self, name: impl Into<String>) -> Self {
        self.broadcaster_name = name.into();
        self
    }

    pub fn broadcaster_avatar(mut self, url: impl Into<String>) -> Self {
        self.broadcaster_avatar = Some(url.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    pub fn private(mut self, is_private: bool) -> Self {
        self.is_private = is_private;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Names of required fields that are empty or whitespace.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.broadcaster_id.trim().is_empty() {
            missing.push("broadcasterId");
        }
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.channel_name.trim().is_empty() {
            missing.push("channelName");
        }
        missing
    }
}

/// A live (or just-ended) broadcast session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub broadcaster_id: String,
    pub broadcaster_name: String,
    pub broadcaster_avatar: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub quality: String,
    pub is_private: bool,
    pub tags: Vec<String>,
    pub channel_name: String,
    pub token: Option<String>,
    #[serde(flatten)]
    pub stats: SessionStats,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a Live session from a descriptor.
    ///
    /// An empty broadcaster name falls back to the broadcaster id.
    pub fn start(id: SessionId, descriptor: SessionDescriptor, now: DateTime<Utc>) -> Self {
        let broadcaster_name = if descriptor.broadcaster_name.trim().is_empty() {
            descriptor.broadcaster_id.clone()
        } else {
            descriptor.broadcaster_name
        };

        Self {
            id,
            broadcaster_id: descriptor.broadcaster_id,
            broadcaster_name,
            broadcaster_avatar: descriptor.broadcaster_avatar,
            title: descriptor.title,
            description: descriptor.description,
            category: descriptor.category,
            quality: descriptor.quality,
            is_private: descriptor.is_private,
            tags: descriptor.tags,
            channel_name: descriptor.channel_name,
            token: descriptor.token,
            stats: SessionStats::default(),
            status: SessionStatus::Live,
            started_at: now,
            ended_at: None,
        }
    }

    /// Move to Ended. No-op if already ended.
    pub fn finish(&mut self, now: DateTime<Utc>) {
        if self.status == SessionStatus::Live {
            self.status = SessionStatus::Ended;
            self.ended_at = Some(now);
        }
    }

    pub fn is_live(&self) -> bool {
        self.status == SessionStatus::Live
    }

    /// Broadcast duration so far (or in total, once ended).
    pub fn duration(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.ended_at.unwrap_or(now) - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_format() {
        let now = Utc::now();
        let id = SessionId::generate(now);
        let parts: Vec<&str> = id.as_str().splitn(3, '_').collect();

        assert_eq!(parts[0], "stream");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].bytes().all(|b| ID_SUFFIX_CHARSET.contains(&b)));
    }

    #[test]
    fn test_ids_differ_within_same_millisecond() {
        let now = Utc::now();
        assert_ne!(SessionId::generate(now), SessionId::generate(now));
    }

    #[test]
    fn test_partial_update_keeps_untouched_fields() {
        let mut stats = SessionStats::default();
        stats.apply(&StatsUpdate::viewers(5));
        stats.apply(&StatsUpdate::likes(2));

        assert_eq!(stats.viewer_count, 5);
        assert_eq!(stats.likes, 2);
        assert_eq!(stats.comments, 0);

        stats.apply(&StatsUpdate::comments(9));
        assert_eq!((stats.viewer_count, stats.likes, stats.comments), (5, 2, 9));
        assert!(StatsUpdate::default().is_empty());
        assert!(!StatsUpdate::comments(0).is_empty());
    }

    #[test]
    fn test_total_viewers_accumulates_increases() {
        let mut stats = SessionStats::default();
        stats.apply(&StatsUpdate::viewers(10));
        stats.apply(&StatsUpdate::viewers(4));
        stats.apply(&StatsUpdate::viewers(7));

        assert_eq!(stats.viewer_count, 7);
        assert_eq!(stats.total_viewers, 13);
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            SessionDescriptor::default().missing_fields(),
            vec!["broadcasterId", "title", "channelName"]
        );
        assert_eq!(
            SessionDescriptor::new("u1", "  ", "ch1").missing_fields(),
            vec!["title"]
        );
        assert!(SessionDescriptor::new("u1", "t", "ch1").missing_fields().is_empty());
    }

    #[test]
    fn test_finish_is_one_way() {
        let t0 = Utc::now();
        let mut session = Session::start(SessionId::new("s"), SessionDescriptor::new("u1", "t", "c"), t0);
        assert!(session.is_live());
        assert_eq!(session.broadcaster_name, "u1");

        let t1 = t0 + chrono::Duration::seconds(30);
        session.finish(t1);
        session.finish(t1 + chrono::Duration::seconds(30));

        assert_eq!(session.status, SessionStatus::Ended);
        assert_eq!(session.ended_at, Some(t1));
        assert_eq!(session.duration(t1 + chrono::Duration::hours(1)).num_seconds(), 30);
    }

    #[test]
    fn test_session_json_shape() {
        let session = Session::start(
            SessionId::new("stream_1_abc"),
            SessionDescriptor::new("u1", "Title", "ch1").tag("tarot"),
            Utc::now(),
        );
        let json = serde_json::to_value(&session).unwrap();

        assert_eq!(json["id"], "stream_1_abc");
        assert_eq!(json["broadcasterId"], "u1");
        assert_eq!(json["channelName"], "ch1");
        assert_eq!(json["viewerCount"], 0);
        assert_eq!(json["totalViewers"], 0);
        assert_eq!(json["status"], "live");
        assert!(json["endedAt"].is_null());
        assert_eq!(json["tags"][0], "tarot");

        let back: Session = serde_json::from_value(json).unwrap();
        assert_eq!(back, session);
    }

    proptest::proptest! {
        #[test]
        fn test_total_viewers_never_below_current(
            counts in proptest::collection::vec(0u64..10_000, 1..50)
        ) {
            let mut stats = SessionStats::default();
            let mut previous_total = 0;
            for count in counts {
                stats.apply(&StatsUpdate::viewers(count));
                proptest::prop_assert!(stats.total_viewers >= stats.viewer_count);
                proptest::prop_assert!(stats.total_viewers >= previous_total);
                previous_total = stats.total_viewers;
            }
        }
    }
}
