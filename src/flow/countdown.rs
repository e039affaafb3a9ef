use log::{debug, warn};

use crate::clock::Clock;
use crate::store::{KeyValueStore, StoreError, OTP_TIMER_START_KEY};

/// Resend countdown for the verification code.
///
/// The countdown is not a ticking task: it records the epoch at which the
/// code was issued and derives the remaining seconds from the injected clock
/// on demand. The epoch is persisted so a flow restarted mid-countdown
/// resumes with the correct remaining time instead of a fresh 60 seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    started_at_millis: i64,
    duration_secs: u64,
}

impl Countdown {
    /// Arm a fresh countdown at "now" and persist its epoch
    pub fn start(
        clock: &dyn Clock,
        store: &dyn KeyValueStore,
        duration_secs: u64,
    ) -> Result<Self, StoreError> {
        let started_at_millis = clock.now_millis();
        store.save(OTP_TIMER_START_KEY, &started_at_millis.to_string())?;
        debug!("Resend countdown armed for {}s", duration_secs);

        Ok(Self {
            started_at_millis,
            duration_secs,
        })
    }

    /// Load a previously persisted countdown.
    ///
    /// Missing or corrupt state is treated as "not started" and reported as
    /// `None`; it never fails the flow.
    pub fn load(
        store: &dyn KeyValueStore,
        duration_secs: u64,
    ) -> Result<Option<Self>, StoreError> {
        let raw = match store.load(OTP_TIMER_START_KEY)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match raw.trim().parse::<i64>() {
            Ok(started_at_millis) => Ok(Some(Self {
                started_at_millis,
                duration_secs,
            })),
            Err(_) => {
                warn!("Persisted countdown epoch {:?} is corrupt, starting fresh", raw);
                Ok(None)
            }
        }
    }

    /// Remove the persisted epoch
    pub fn clear(store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store.remove(OTP_TIMER_START_KEY)
    }

    /// Seconds left before a resend is allowed.
    ///
    /// Pure function of the stored epoch and the clock; monotonically
    /// non-increasing between explicit restarts. A clock that reads before
    /// the epoch (manual clocks, adjusted wall clocks) counts as no time
    /// elapsed.
    pub fn remaining_secs(&self, clock: &dyn Clock) -> u64 {
        let elapsed_millis = (clock.now_millis() - self.started_at_millis).max(0);
        let elapsed_secs = (elapsed_millis / 1000) as u64;
        self.duration_secs.saturating_sub(elapsed_secs)
    }

    /// Whether the cooldown has fully elapsed
    pub fn can_resend(&self, clock: &dyn Clock) -> bool {
        self.remaining_secs(clock) == 0
    }

    /// Epoch millis at which this countdown was armed
    pub fn started_at_millis(&self) -> i64 {
        self.started_at_millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;

    #[test]
    fn test_start_persists_epoch() {
        let clock = ManualClock::at_millis(1_700_000_000_000);
        let store = MemoryStore::new();

        let countdown = Countdown::start(&clock, &store, 60).unwrap();

        assert_eq!(countdown.started_at_millis(), 1_700_000_000_000);
        assert_eq!(
            store.load(OTP_TIMER_START_KEY).unwrap(),
            Some("1700000000000".to_string())
        );
    }

    #[test]
    fn test_remaining_counts_down() {
        let clock = ManualClock::at_millis(0);
        let store = MemoryStore::new();
        let countdown = Countdown::start(&clock, &store, 60).unwrap();

        assert_eq!(countdown.remaining_secs(&clock), 60);
        assert!(!countdown.can_resend(&clock));

        clock.advance_secs(40);
        assert_eq!(countdown.remaining_secs(&clock), 20);

        clock.advance_secs(20);
        assert_eq!(countdown.remaining_secs(&clock), 0);
        assert!(countdown.can_resend(&clock));

        // Never goes negative
        clock.advance_secs(100);
        assert_eq!(countdown.remaining_secs(&clock), 0);
    }

    #[test]
    fn test_load_resumes_persisted_epoch() {
        let store = MemoryStore::new();
        let clock = ManualClock::at_millis(100_000);

        // Epoch persisted 40 seconds ago with a 60 second duration
        store.save(OTP_TIMER_START_KEY, "60000").unwrap();

        let countdown = Countdown::load(&store, 60).unwrap().unwrap();
        assert_eq!(countdown.remaining_secs(&clock), 20);
    }

    #[test]
    fn test_load_missing_is_none() {
        let store = MemoryStore::new();
        assert_eq!(Countdown::load(&store, 60).unwrap(), None);
    }

    #[test]
    fn test_load_corrupt_is_none() {
        let store = MemoryStore::new();
        store.save(OTP_TIMER_START_KEY, "not-a-number").unwrap();

        assert_eq!(Countdown::load(&store, 60).unwrap(), None);
    }

    #[test]
    fn test_clear_removes_epoch() {
        let clock = ManualClock::at_millis(5_000);
        let store = MemoryStore::new();

        Countdown::start(&clock, &store, 60).unwrap();
        Countdown::clear(&store).unwrap();

        assert_eq!(store.load(OTP_TIMER_START_KEY).unwrap(), None);
        assert_eq!(Countdown::load(&store, 60).unwrap(), None);
    }

    #[test]
    fn test_clock_before_epoch_counts_as_no_elapsed_time() {
        let clock = ManualClock::at_millis(10_000);
        let store = MemoryStore::new();
        let countdown = Countdown::start(&clock, &store, 60).unwrap();

        clock.set_millis(0);
        assert_eq!(countdown.remaining_secs(&clock), 60);
    }
}
