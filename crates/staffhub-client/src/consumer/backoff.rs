//! Reconnect delay policy.

use std::time::Duration;

use rand::Rng;

use staffhub_core::config::ReconnectConfig;

/// How long to wait between reconnect attempts, and for how long to keep
/// trying.
///
/// The default is a constant 3 second delay, retried forever.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Growth factor per consecutive failure; `1.0` keeps the delay constant.
    pub multiplier: f64,
    /// Upper bound on the delay.
    pub max_delay: Duration,
    /// Random spread as a fraction of the delay, `0.0..=1.0`.
    pub jitter: f64,
    /// Retries after which the consumer gives up; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&ReconnectConfig::default())
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self {
            base_delay: Duration::from_millis(config.base_delay_ms),
            multiplier: config.multiplier.max(1.0),
            max_delay: Duration::from_millis(config.max_delay_ms.max(config.base_delay_ms)),
            jitter: config.jitter.clamp(0.0, 1.0),
            max_attempts: config.max_attempts,
        }
    }
}

impl ReconnectPolicy {
    /// Constant delay, retried forever.
    pub fn constant(delay: Duration) -> Self {
        Self {
            base_delay: delay,
            multiplier: 1.0,
            max_delay: delay,
            jitter: 0.0,
            max_attempts: None,
        }
    }
}

/// Per-connection retry state derived from a [`ReconnectPolicy`].
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    current: Duration,
    attempts: u32,
}

impl Backoff {
    /// Start at the policy's base delay.
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            current: policy.base_delay,
            policy,
            attempts: 0,
        }
    }

    /// Delay before the next retry, or `None` once the retry cap is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self
            .policy
            .max_attempts
            .is_some_and(|max| self.attempts >= max)
        {
            return None;
        }
        self.attempts += 1;

        let delay = self.current;
        let next = self.current.mul_f64(self.policy.multiplier);
        self.current = next.min(self.policy.max_delay);
        Some(self.jittered(delay))
    }

    /// Forget past failures after a successful connection.
    pub fn reset(&mut self) {
        self.current = self.policy.base_delay;
        self.attempts = 0;
    }

    /// Consecutive retries handed out since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.policy.jitter <= 0.0 {
            return delay;
        }
        let spread = self.policy.jitter;
        let factor = 1.0 + rand::rng().random_range(-spread..=spread);
        delay.mul_f64(factor.max(0.0)).min(self.policy.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_constant_three_seconds_forever() {
        let mut backoff = Backoff::new(ReconnectPolicy::default());
        for _ in 0..1000 {
            assert_eq!(backoff.next_delay(), Some(Duration::from_secs(3)));
        }
    }

    #[test]
    fn test_exponential_growth_is_capped() {
        let mut backoff = Backoff::new(ReconnectPolicy {
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_delay: Duration::from_secs(5),
            jitter: 0.0,
            max_attempts: None,
        });
        let delays: Vec<u64> = (0..5)
            .map(|_| backoff.next_delay().unwrap().as_secs())
            .collect();
        assert_eq!(delays, vec![1, 2, 4, 5, 5]);

        backoff.reset();
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_attempt_cap() {
        let mut backoff = Backoff::new(ReconnectPolicy {
            max_attempts: Some(2),
            ..ReconnectPolicy::constant(Duration::from_millis(10))
        });
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert_eq!(backoff.next_delay(), None);
        backoff.reset();
        assert!(backoff.next_delay().is_some());
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let mut backoff = Backoff::new(ReconnectPolicy {
            jitter: 0.5,
            max_delay: Duration::from_secs(10),
            ..ReconnectPolicy::constant(Duration::from_secs(2))
        });
        for _ in 0..100 {
            let delay = backoff.next_delay().unwrap();
            assert!(delay >= Duration::from_secs(1));
            assert!(delay <= Duration::from_secs(3));
        }
    }

    #[test]
    fn test_policy_from_config() {
        let policy = ReconnectPolicy::from(&ReconnectConfig {
            base_delay_ms: 500,
            multiplier: 0.5,
            max_delay_ms: 100,
            jitter: 3.0,
            max_attempts: Some(4),
        });
        assert_eq!(policy.multiplier, 1.0);
        assert_eq!(policy.max_delay, Duration::from_millis(500));
        assert_eq!(policy.jitter, 1.0);
        assert_eq!(policy.max_attempts, Some(4));
    }
}
