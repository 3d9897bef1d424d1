//! Wait computation between retry attempts.

use rand::Rng;
use std::time::Duration;

/// Exponential backoff with bounded jitter.
///
/// The computed wait for attempt `n` is `base * 2^(n-1)` scaled by a random
/// factor in `[1, 1 + jitter]`, then capped at `max`. With `jitter <= 1.0`
/// successive computed waits never decrease.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    base: Duration,
    max: Duration,
    jitter: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(500),
            max: Duration::from_secs(30),
            jitter: 0.25,
        }
    }
}

impl BackoffPolicy {
    /// Build a policy; `jitter` is clamped into `[0, 1]` and `max` is raised
    /// to at least `base`.
    pub fn new(base: Duration, max: Duration, jitter: f64) -> Self {
        let jitter = if jitter.is_finite() {
            jitter.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            base,
            max: max.max(base),
            jitter,
        }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Wait before attempt `attempt + 1`. A server hint wins verbatim.
    pub fn delay_for(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        match hint {
            Some(hint) => hint,
            None => self.computed_delay(attempt, rand::thread_rng().gen::<f64>()),
        }
    }

    /// Exponential delay for a given jitter sample in `[0, 1)`.
    pub(crate) fn computed_delay(&self, attempt: u32, sample: f64) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let base_ms = self.base.as_millis() as f64;
        let exp_ms = base_ms * 2f64.powi(exponent as i32);
        let factor = 1.0 + self.jitter * sample.clamp(0.0, 1.0);
        let capped_ms = (exp_ms * factor).min(self.max.as_millis() as f64);
        Duration::from_millis(capped_ms.max(0.0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> BackoffPolicy {
        BackoffPolicy::new(Duration::from_millis(100), Duration::from_secs(2), 0.25)
    }

    #[test]
    fn hint_overrides_computed_backoff_exactly() {
        let hint = Duration::from_millis(1_750);
        assert_eq!(policy().delay_for(1, Some(hint)), hint);
        assert_eq!(policy().delay_for(7, Some(Duration::ZERO)), Duration::ZERO);
    }

    #[test]
    fn computed_delay_doubles_without_jitter() {
        let p = policy();
        assert_eq!(p.computed_delay(1, 0.0), Duration::from_millis(100));
        assert_eq!(p.computed_delay(2, 0.0), Duration::from_millis(200));
        assert_eq!(p.computed_delay(3, 0.0), Duration::from_millis(400));
    }

    #[test]
    fn jitter_is_bounded_by_ratio() {
        let p = policy();
        assert_eq!(p.computed_delay(1, 1.0), Duration::from_millis(125));
        for _ in 0..50 {
            let d = p.delay_for(1, None);
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(125));
        }
    }

    #[test]
    fn delay_is_capped_at_max() {
        let p = policy();
        assert_eq!(p.computed_delay(10, 0.5), Duration::from_secs(2));
        assert_eq!(p.computed_delay(u32::MAX, 1.0), Duration::from_secs(2));
    }

    #[test]
    fn worst_case_jitter_never_produces_a_shorter_next_wait() {
        let p = policy();
        for attempt in 1..12 {
            let high = p.computed_delay(attempt, 1.0);
            let low_next = p.computed_delay(attempt + 1, 0.0);
            assert!(low_next >= high, "attempt {attempt}: {low_next:?} < {high:?}");
        }
    }

    #[test]
    fn constructor_sanitizes_inputs() {
        let p = BackoffPolicy::new(Duration::from_secs(5), Duration::from_secs(1), f64::NAN);
        assert_eq!(p.max(), Duration::from_secs(5));
        assert_eq!(p.jitter(), 0.0);
        assert_eq!(
            BackoffPolicy::new(Duration::ZERO, Duration::ZERO, 7.0).jitter(),
            1.0
        );
    }

    #[cfg(feature = "fuzz-tests")]
    mod fuzz {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn successive_waits_never_decrease(
                base_ms in 1u64..5_000,
                max_ms in 1u64..120_000,
                jitter in 0.0f64..=1.0,
                samples in proptest::collection::vec(0.0f64..1.0, 2..10)
            ) {
                let p = BackoffPolicy::new(
                    Duration::from_millis(base_ms),
                    Duration::from_millis(max_ms),
                    jitter,
                );
                let waits: Vec<Duration> = samples
                    .iter()
                    .enumerate()
                    .map(|(idx, sample)| p.computed_delay(idx as u32 + 1, *sample))
                    .collect();
                for pair in waits.windows(2) {
                    prop_assert!(pair[1] >= pair[0]);
                }
            }
        }
    }
}
