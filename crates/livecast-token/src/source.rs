//! Time and salt sources for the issuer.
//!
//! The issuer never reads the wall clock or the RNG directly. Production code
//! uses [`SystemClock`] and [`RandomSalt`]; tests pin both with
//! [`FixedClock`] and [`FixedSalt`] to get reproducible bytes.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// Source of the `issued_at` timestamp.
pub trait Clock: Send + Sync {
    /// Current time in whole seconds since the Unix epoch.
    fn unix_seconds(&self) -> u32;
}

/// Source of the per-token salt.
pub trait SaltSource: Send + Sync {
    /// Draw the next salt.
    fn next_salt(&self) -> u32;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> u32 {
        // A clock before 1970 reads as the epoch; past 2106 it saturates.
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}

/// Uniform salt over the full u32 range from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSalt;

impl SaltSource for RandomSalt {
    fn next_salt(&self) -> u32 {
        rand::thread_rng().gen()
    }
}

/// A clock that can be set by hand.
#[derive(Debug, Default)]
pub struct FixedClock(AtomicU32);

impl FixedClock {
    pub fn new(unix_seconds: u32) -> Self {
        Self(AtomicU32::new(unix_seconds))
    }

    /// Move the clock to `unix_seconds`.
    pub fn set(&self, unix_seconds: u32) {
        self.0.store(unix_seconds, Ordering::SeqCst);
    }

    /// Move the clock forward.
    pub fn advance(&self, secs: u32) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn unix_seconds(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

/// A salt source that always returns the same value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSalt(pub u32);

impl SaltSource for FixedSalt {
    fn next_salt(&self) -> u32 {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn unix_seconds(&self) -> u32 {
        (**self).unix_seconds()
    }
}

impl<S: SaltSource + ?Sized> SaltSource for std::sync::Arc<S> {
    fn next_salt(&self) -> u32 {
        (**self).next_salt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_system_clock_is_recent() {
        // 2024-01-01T00:00:00Z
        assert!(SystemClock.unix_seconds() > 1_704_067_200);
    }

    #[test]
    fn test_fixed_clock_moves_only_by_hand() {
        let clock = FixedClock::new(100);
        assert_eq!(clock.unix_seconds(), 100);
        clock.advance(5);
        assert_eq!(clock.unix_seconds(), 105);
        clock.set(7);
        assert_eq!(clock.unix_seconds(), 7);
    }

    #[test]
    fn test_shared_clock_through_arc() {
        let clock = Arc::new(FixedClock::new(10));
        let handle: Arc<FixedClock> = Arc::clone(&clock);
        clock.advance(1);
        assert_eq!(handle.unix_seconds(), 11);
    }

    #[test]
    fn test_random_salt_varies() {
        let salts: std::collections::HashSet<u32> = (0..64).map(|_| RandomSalt.next_salt()).collect();
        assert!(salts.len() > 1);
    }
}
