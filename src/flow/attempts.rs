use log::{debug, warn};

use crate::store::{KeyValueStore, StoreError, OTP_ATTEMPTS_KEY};

/// Failed-attempt limiter for code verification.
///
/// Counts consecutive failed verifications and blocks further attempts once
/// the maximum is reached. The count is persisted so restarting the flow
/// mid-countdown does not grant a fresh budget; it is zeroed whenever a new
/// code is issued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptLimiter {
    count: u32,
    max: u32,
}

impl AttemptLimiter {
    /// A fresh limiter with zero recorded failures
    pub fn new(max: u32) -> Self {
        Self { count: 0, max }
    }

    /// Load the persisted count.
    ///
    /// A missing or corrupt value loads as zero; it never fails the flow.
    pub fn load(store: &dyn KeyValueStore, max: u32) -> Result<Self, StoreError> {
        let count = match store.load(OTP_ATTEMPTS_KEY)? {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(count) => count,
                Err(_) => {
                    warn!("Persisted attempt count {:?} is corrupt, starting at 0", raw);
                    0
                }
            },
            None => 0,
        };

        Ok(Self { count, max })
    }

    /// Record one failed verification and persist the new count
    pub fn record_failure(&mut self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        self.count += 1;
        store.save(OTP_ATTEMPTS_KEY, &self.count.to_string())?;
        debug!("Failed verification recorded ({}/{})", self.count, self.max);
        Ok(())
    }

    /// Whether the attempt budget is used up
    pub fn is_exhausted(&self) -> bool {
        self.count >= self.max
    }

    /// Attempts left before verification is refused
    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.count)
    }

    /// Failed attempts recorded so far
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Zero the counter, persisting the zero. Called whenever a code is
    /// issued or reissued.
    pub fn reset(&mut self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        self.count = 0;
        store.save(OTP_ATTEMPTS_KEY, "0")
    }

    /// Remove the persisted count entirely
    pub fn clear(store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store.remove(OTP_ATTEMPTS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_failures_accumulate_until_exhausted() {
        let store = MemoryStore::new();
        let mut limiter = AttemptLimiter::new(5);

        for expected_remaining in (0..5).rev() {
            assert!(!limiter.is_exhausted());
            limiter.record_failure(&store).unwrap();
            assert_eq!(limiter.remaining(), expected_remaining);
        }

        assert!(limiter.is_exhausted());
        assert_eq!(store.load(OTP_ATTEMPTS_KEY).unwrap(), Some("5".to_string()));
    }

    #[test]
    fn test_load_resumes_persisted_count() {
        let store = MemoryStore::new();
        store.save(OTP_ATTEMPTS_KEY, "3").unwrap();

        let limiter = AttemptLimiter::load(&store, 5).unwrap();
        assert_eq!(limiter.count(), 3);
        assert_eq!(limiter.remaining(), 2);
        assert!(!limiter.is_exhausted());
    }

    #[test]
    fn test_load_missing_or_corrupt_is_zero() {
        let store = MemoryStore::new();
        assert_eq!(AttemptLimiter::load(&store, 5).unwrap().count(), 0);

        store.save(OTP_ATTEMPTS_KEY, "many").unwrap();
        assert_eq!(AttemptLimiter::load(&store, 5).unwrap().count(), 0);
    }

    #[test]
    fn test_reset_zeroes_and_persists() {
        let store = MemoryStore::new();
        let mut limiter = AttemptLimiter::new(5);

        limiter.record_failure(&store).unwrap();
        limiter.record_failure(&store).unwrap();
        limiter.reset(&store).unwrap();

        assert_eq!(limiter.count(), 0);
        assert_eq!(limiter.remaining(), 5);
        assert_eq!(store.load(OTP_ATTEMPTS_KEY).unwrap(), Some("0".to_string()));
    }

    #[test]
    fn test_clear_removes_key() {
        let store = MemoryStore::new();
        let mut limiter = AttemptLimiter::new(5);

        limiter.record_failure(&store).unwrap();
        AttemptLimiter::clear(&store).unwrap();

        assert_eq!(store.load(OTP_ATTEMPTS_KEY).unwrap(), None);
    }

    #[test]
    fn test_count_past_max_stays_exhausted() {
        let store = MemoryStore::new();
        store.save(OTP_ATTEMPTS_KEY, "9").unwrap();

        let limiter = AttemptLimiter::load(&store, 5).unwrap();
        assert!(limiter.is_exhausted());
        assert_eq!(limiter.remaining(), 0);
    }
}
