//! Per-key throttling of outbound lookups

use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::store::{MemoryStore, StateStore};

/// Expired entries are swept after this many granted calls.
const SWEEP_EVERY: usize = 256;

/// Allows one call per key per `window`. Last-call instants live in an
/// injected [`StateStore`]; the check and the update are a single
/// [`StateStore::put_if`], so concurrent calls for one key admit only one.
pub struct Cooldown<K> {
    window: Duration,
    last_call: Arc<dyn StateStore<K, Instant>>,
    granted: AtomicUsize,
}

impl<K> Cooldown<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Cooldown backed by a fresh [`MemoryStore`].
    pub fn new(window: Duration) -> Self {
        Self::with_store(window, Arc::new(MemoryStore::new()))
    }
}

impl<K> Cooldown<K> {
    pub fn with_store(window: Duration, last_call: Arc<dyn StateStore<K, Instant>>) -> Self {
        Self {
            window,
            last_call,
            granted: AtomicUsize::new(0),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a call for `key` at `now`, or return how long it must still wait.
    pub fn try_acquire_at(&self, key: K, now: Instant) -> Result<(), Duration> {
        let window = self.window;
        let expired = move |previous: &Instant| now.saturating_duration_since(*previous) >= window;

        self.last_call
            .put_if(key, now, &expired)
            .map_err(|previous| window - now.saturating_duration_since(previous))?;

        if (self.granted.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_EVERY == 0 {
            self.sweep_at(now);
        }
        Ok(())
    }

    /// Forget every key whose window has passed at `now`.
    pub fn sweep_at(&self, now: Instant) {
        let window = self.window;
        self.last_call.retain(&move |_: &K, previous: &Instant| {
            now.saturating_duration_since(*previous) < window
        });
    }

    pub fn try_acquire(&self, key: K) -> Result<(), Duration> {
        self.try_acquire_at(key, Instant::now())
    }

    /// Forget `key`, letting its next call through immediately.
    pub fn reset(&self, key: &K) {
        self.last_call.delete(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_within_window() {
        let cooldown = Cooldown::new(Duration::from_secs(3));
        let start = Instant::now();

        assert_eq!(cooldown.try_acquire_at(1u64, start), Ok(()));
        assert_eq!(
            cooldown.try_acquire_at(1u64, start + Duration::from_secs(1)),
            Err(Duration::from_secs(2))
        );
        assert_eq!(
            cooldown.try_acquire_at(1u64, start + Duration::from_secs(3)),
            Ok(())
        );
    }

    #[test]
    fn test_keys_are_independent() {
        let cooldown = Cooldown::new(Duration::from_secs(3));
        let now = Instant::now();

        assert!(cooldown.try_acquire_at(1u64, now).is_ok());
        assert!(cooldown.try_acquire_at(2u64, now).is_ok());
        assert!(cooldown.try_acquire_at(1u64, now).is_err());
    }

    #[test]
    fn test_rejected_call_does_not_extend_window() {
        let cooldown = Cooldown::new(Duration::from_secs(3));
        let start = Instant::now();

        assert!(cooldown.try_acquire_at(1u64, start).is_ok());
        assert!(cooldown.try_acquire_at(1u64, start + Duration::from_secs(2)).is_err());
        assert!(cooldown.try_acquire_at(1u64, start + Duration::from_secs(3)).is_ok());
    }

    #[test]
    fn test_reset() {
        let cooldown = Cooldown::new(Duration::from_secs(60));
        let now = Instant::now();

        assert!(cooldown.try_acquire_at(1u64, now).is_ok());
        cooldown.reset(&1);
        assert!(cooldown.try_acquire_at(1u64, now).is_ok());
    }

    #[test]
    fn test_concurrent_calls_admit_one() {
        let cooldown = Arc::new(Cooldown::new(Duration::from_secs(60)));
        let now = Instant::now();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cooldown = Arc::clone(&cooldown);
                std::thread::spawn(move || cooldown.try_acquire_at(1u64, now).is_ok())
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(admitted, 1);
    }

    #[test]
    fn test_sweep_drops_expired_keys() {
        let store: Arc<MemoryStore<u64, Instant>> = Arc::new(MemoryStore::new());
        let cooldown = Cooldown::with_store(Duration::from_secs(3), store.clone());
        let start = Instant::now();

        assert!(cooldown.try_acquire_at(1u64, start).is_ok());
        assert!(cooldown.try_acquire_at(2u64, start + Duration::from_secs(2)).is_ok());
        cooldown.sweep_at(start + Duration::from_secs(4));

        assert_eq!(store.len(), 1);
        assert!(store.get(&2).is_some());
    }

    #[test]
    fn test_granted_calls_trigger_sweep() {
        let store: Arc<MemoryStore<u64, Instant>> = Arc::new(MemoryStore::new());
        let cooldown = Cooldown::with_store(Duration::from_secs(1), store.clone());
        let start = Instant::now();

        for key in 0..SWEEP_EVERY as u64 - 1 {
            assert!(cooldown.try_acquire_at(key, start).is_ok());
        }
        assert_eq!(store.len(), SWEEP_EVERY - 1);

        // The next grant happens after every earlier window has passed
        let later = start + Duration::from_secs(5);
        assert!(cooldown.try_acquire_at(u64::MAX, later).is_ok());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_zero_window_never_blocks() {
        let cooldown = Cooldown::new(Duration::ZERO);
        let now = Instant::now();
        assert!(cooldown.try_acquire_at(1u64, now).is_ok());
        assert!(cooldown.try_acquire_at(1u64, now).is_ok());
    }
}
