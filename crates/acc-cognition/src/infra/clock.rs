//! Time sources for evidence timestamps

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Injectable now-provider
pub trait Clock: Send + Sync {
    /// Current time in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
///
/// Clones share the same underlying time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    /// Current time in milliseconds since epoch
    current_time_ms: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock starting at the given time
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            current_time_ms: Arc::new(AtomicI64::new(start_time.timestamp_millis())),
        }
    }

    /// Create a clock starting at the Unix epoch
    pub fn from_epoch() -> Self {
        Self::from_millis(0)
    }

    /// Create a clock starting at a millisecond timestamp
    pub fn from_millis(ms: i64) -> Self {
        Self {
            current_time_ms: Arc::new(AtomicI64::new(ms)),
        }
    }

    /// Advance time by the given duration
    pub fn advance(&self, duration: Duration) {
        debug_assert!(duration >= Duration::zero(), "cannot go back in time");
        self.current_time_ms
            .fetch_add(duration.num_milliseconds(), Ordering::SeqCst);
    }

    /// Advance time by the given number of milliseconds
    pub fn advance_ms(&self, ms: i64) {
        self.current_time_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Set the current time
    pub fn set(&self, time: DateTime<Utc>) {
        self.current_time_ms
            .store(time.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let ms = self.current_time_ms.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(ms).unwrap_or_default()
    }
}
