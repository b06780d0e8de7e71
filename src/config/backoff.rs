//! Reconnect backoff strategy
//!
//! The wait before retry `N` is drawn from
//! `rand(0 ... factor * exponent_base^N)` milliseconds, narrowed by the jitter
//! percentage. After `num_of_retries` attempts the interval stops growing and
//! the last ceiling is reused until a reconnect succeeds.

use serde::Deserialize;
use std::time::Duration;

use crate::wire::ConnectionRetryStrategy;

/// Jitter applied when none is configured
pub const DEFAULT_JITTER_PERCENT: u32 = 20;

/// Backoff strategy descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BackoffStrategy {
    /// Attempts during which the interval keeps growing
    pub num_of_retries: u32,
    /// Multiplier in milliseconds
    pub factor: u32,
    pub exponent_base: u32,
    #[serde(default)]
    pub jitter_percent: Option<u32>,
}

impl BackoffStrategy {
    pub fn new(num_of_retries: u32, factor: u32, exponent_base: u32) -> Self {
        Self {
            num_of_retries,
            factor,
            exponent_base,
            jitter_percent: None,
        }
    }

    pub fn with_jitter_percent(mut self, jitter: u32) -> Self {
        self.jitter_percent = Some(jitter);
        self
    }

    /// Jitter in percent, capped at 100
    pub fn effective_jitter_percent(&self) -> u32 {
        self.jitter_percent.unwrap_or(DEFAULT_JITTER_PERCENT).min(100)
    }

    /// Upper bound of the wait before retry `attempt` (0-based)
    pub fn max_delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(self.num_of_retries);
        let millis = (self.exponent_base as u64)
            .saturating_pow(exponent)
            .saturating_mul(self.factor as u64);
        Duration::from_millis(millis)
    }

    /// Jittered wait before retry `attempt`
    ///
    /// Sampled uniformly from `[ceiling * (1 - jitter%), ceiling]`.
    pub fn delay_for_attempt(&self, attempt: u32, rng: &mut fastrand::Rng) -> Duration {
        let ceiling = self.max_delay_for_attempt(attempt).as_millis() as u64;
        let spread = ceiling / 100 * self.effective_jitter_percent() as u64
            + ceiling % 100 * self.effective_jitter_percent() as u64 / 100;
        let floor = ceiling - spread;
        Duration::from_millis(rng.u64(floor..=ceiling))
    }

    /// Ceilings for the growing phase, one per retry
    pub fn schedule(&self) -> Vec<Duration> {
        (0..=self.num_of_retries)
            .map(|attempt| self.max_delay_for_attempt(attempt))
            .collect()
    }

    pub(crate) fn to_wire(&self) -> ConnectionRetryStrategy {
        ConnectionRetryStrategy {
            number_of_retries: self.num_of_retries,
            factor: self.factor,
            exponent_base: self.exponent_base,
            jitter_percent: self.jitter_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_grows_then_caps() {
        let strategy = BackoffStrategy::new(3, 10, 2);
        assert_eq!(strategy.max_delay_for_attempt(0), Duration::from_millis(10));
        assert_eq!(strategy.max_delay_for_attempt(1), Duration::from_millis(20));
        assert_eq!(strategy.max_delay_for_attempt(3), Duration::from_millis(80));
        // retries exhausted: last interval is reused
        assert_eq!(strategy.max_delay_for_attempt(4), Duration::from_millis(80));
        assert_eq!(strategy.max_delay_for_attempt(100), Duration::from_millis(80));
    }

    #[test]
    fn test_schedule() {
        let strategy = BackoffStrategy::new(2, 100, 3);
        assert_eq!(
            strategy.schedule(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(300),
                Duration::from_millis(900),
            ]
        );
    }

    #[test]
    fn test_ceiling_saturates() {
        let strategy = BackoffStrategy::new(u32::MAX, u32::MAX, u32::MAX);
        assert_eq!(strategy.max_delay_for_attempt(50), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_jittered_delay_within_bounds() {
        let strategy = BackoffStrategy::new(5, 100, 2).with_jitter_percent(30);
        let mut rng = fastrand::Rng::with_seed(42);
        for attempt in 0..10 {
            let ceiling = strategy.max_delay_for_attempt(attempt);
            let floor = ceiling.mul_f64(0.7);
            let delay = strategy.delay_for_attempt(attempt, &mut rng);
            assert!(delay <= ceiling, "attempt {}: {:?} > {:?}", attempt, delay, ceiling);
            assert!(delay >= floor, "attempt {}: {:?} < {:?}", attempt, delay, floor);
        }
    }

    #[test]
    fn test_zero_jitter_is_deterministic() {
        let strategy = BackoffStrategy::new(4, 50, 2).with_jitter_percent(0);
        let mut rng = fastrand::Rng::with_seed(7);
        assert_eq!(strategy.delay_for_attempt(2, &mut rng), Duration::from_millis(200));
    }

    #[test]
    fn test_seeded_rng_reproducible() {
        let strategy = BackoffStrategy::new(4, 50, 2);
        let a = strategy.delay_for_attempt(3, &mut fastrand::Rng::with_seed(1));
        let b = strategy.delay_for_attempt(3, &mut fastrand::Rng::with_seed(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_jitter_default_and_cap() {
        assert_eq!(BackoffStrategy::new(1, 1, 2).effective_jitter_percent(), 20);
        assert_eq!(
            BackoffStrategy::new(1, 1, 2).with_jitter_percent(250).effective_jitter_percent(),
            100
        );
    }

    #[test]
    fn test_to_wire() {
        let wire = BackoffStrategy::new(5, 10, 50).to_wire();
        assert_eq!(wire.number_of_retries, 5);
        assert_eq!(wire.factor, 10);
        assert_eq!(wire.exponent_base, 50);
        assert_eq!(wire.jitter_percent, None);

        let wire = BackoffStrategy::new(5, 10, 50).with_jitter_percent(25).to_wire();
        assert_eq!(wire.jitter_percent, Some(25));
    }
}
