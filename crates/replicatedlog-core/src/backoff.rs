//! Jittered exponential backoff for the master's per-secondary retry loop.
//!
//! Generalizes the `IntervalFunction` abstraction this workspace uses
//! elsewhere (fixed / exponential / exponential-random interval
//! strategies) down to the one formula the replication worker needs:
//! delay doubles per failed attempt up to a cap, then a uniform jitter
//! in `[0, 0.5 * capped_delay]` is added on top (never subtracted), so
//! the jittered delay can exceed the cap by up to 50%.

use std::time::Duration;

use rand::Rng;

/// Stateful sequence of retry delays for one secondary's worker loop.
///
/// Each call to [`ReplicationBackoff::next_delay`] both returns the delay
/// to sleep for *and* advances the internal un-jittered base delay for
/// the following attempt, mirroring the `delay = min(delay * 2, MAX)`
/// progression in the retry loop.
#[derive(Debug, Clone)]
pub struct ReplicationBackoff {
    base: Duration,
    max: Duration,
    next_base: Duration,
}

impl ReplicationBackoff {
    /// Creates a new backoff sequence starting at `base`, doubling up to
    /// `max` on each subsequent call.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            next_base: base,
        }
    }

    /// Resets the sequence back to the initial base delay.
    ///
    /// Called when a head-of-queue item succeeds, so the *next* distinct
    /// message starts its own retry loop from `RETRY_BASE_DELAY` again.
    pub fn reset(&mut self) {
        self.next_base = self.base;
    }

    /// Returns the jittered delay for the current attempt and advances
    /// the sequence for the next one.
    pub fn next_delay(&mut self) -> Duration {
        let capped = self.next_base.min(self.max);
        self.next_base = (self.next_base * 2).min(self.max);
        Self::jittered(capped)
    }

    fn jittered(capped: Duration) -> Duration {
        let jitter_upper = capped.mul_f64(0.5);
        if jitter_upper.is_zero() {
            return capped;
        }
        let jitter_secs = rand::rng().random_range(0.0..=jitter_upper.as_secs_f64());
        capped + Duration::from_secs_f64(jitter_secs)
    }
}
