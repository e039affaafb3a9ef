use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of the current time for the flow.
///
/// The countdown is a pure function of a stored epoch and "now", so the clock
/// is injected rather than read ambiently. Production code uses
/// [`SystemClock`]; tests use [`ManualClock`] to step time explicitly.
pub trait Clock {
    /// Current time in milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to
///
/// Handles are cheap to clone and share the same underlying instant, so a
/// test can keep one handle while the flow owns another.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock pinned at the given epoch millis
    pub fn at_millis(millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(millis)),
        }
    }

    /// Move the clock to an absolute instant
    pub fn set_millis(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    /// Advance the clock by whole seconds
    pub fn advance_secs(&self, secs: i64) {
        self.now.fetch_add(secs * 1000, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotone_enough() {
        let clock = SystemClock;
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::at_millis(1_000_000);
        assert_eq!(clock.now_millis(), 1_000_000);

        clock.advance_secs(40);
        assert_eq!(clock.now_millis(), 1_040_000);

        clock.set_millis(0);
        assert_eq!(clock.now_millis(), 0);
    }

    #[test]
    fn test_manual_clock_handles_share_time() {
        let clock = ManualClock::at_millis(5_000);
        let handle = clock.clone();

        handle.advance_secs(10);
        assert_eq!(clock.now_millis(), 15_000);
    }
}
