use std::time::Duration;

use hireo_settings::ReconnectSettings;

/// Retry limits for the push channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_attempts: 5,
        }
    }
}

impl From<&ReconnectSettings> for ReconnectPolicy {
    fn from(settings: &ReconnectSettings) -> Self {
        Self {
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_attempts: settings.max_attempts,
        }
    }
}

/// Attempt counter and current delay between reconnects.
///
/// Delay for attempt `n` (1-based) is `base_delay * 2^(n-1)`. A successful
/// connection resets both, so the next disruption starts a fresh series.
#[derive(Clone, Debug)]
pub struct Reconnector {
    policy: ReconnectPolicy,
    attempts: u32,
    delay: Duration,
}

impl Reconnector {
    pub fn new(policy: ReconnectPolicy) -> Self {
        let delay = policy.base_delay;
        Self {
            policy,
            attempts: 0,
            delay,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.policy.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.policy.max_attempts
    }

    /// Called on a successful open.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.delay = self.policy.base_delay;
    }

    /// Consume one attempt and return how long to wait before it, or `None`
    /// once every attempt has been used.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }
        self.attempts += 1;
        let delay = self.delay;
        self.delay = delay.checked_mul(2).unwrap_or(Duration::MAX);
        Some(delay)
    }
}

impl Default for Reconnector {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn default_series_is_1_2_4_8_16_then_stops() {
        let mut r = Reconnector::default();
        let delays: Vec<_> = std::iter::from_fn(|| r.next_delay()).collect();
        assert_eq!(delays, vec![secs(1), secs(2), secs(4), secs(8), secs(16)]);
        assert!(r.is_exhausted());
        assert_eq!(r.attempts(), 5);
        assert_eq!(r.next_delay(), None);
        assert_eq!(r.attempts(), 5);
    }

    #[test]
    fn reset_after_two_failures_restarts_at_base() {
        let mut r = Reconnector::default();
        assert_eq!(r.next_delay(), Some(secs(1)));
        assert_eq!(r.next_delay(), Some(secs(2)));
        r.reset();
        assert_eq!(r.attempts(), 0);
        assert_eq!(r.next_delay(), Some(secs(1)));
    }

    #[test]
    fn reset_after_exhaustion_allows_new_series() {
        let mut r = Reconnector::default();
        while r.next_delay().is_some() {}
        r.reset();
        assert!(!r.is_exhausted());
        assert_eq!(r.next_delay(), Some(secs(1)));
    }

    #[test]
    fn zero_attempts_never_retries() {
        let mut r = Reconnector::new(ReconnectPolicy {
            base_delay: secs(1),
            max_attempts: 0,
        });
        assert!(r.is_exhausted());
        assert_eq!(r.next_delay(), None);
    }

    #[test]
    fn huge_series_saturates() {
        let mut r = Reconnector::new(ReconnectPolicy {
            base_delay: Duration::MAX / 2,
            max_attempts: 4,
        });
        assert_eq!(r.next_delay(), Some(Duration::MAX / 2));
        assert!(r.next_delay().is_some());
        assert_eq!(r.next_delay(), Some(Duration::MAX));
    }

    #[test]
    fn policy_from_settings() {
        let settings = ReconnectSettings {
            base_delay_ms: 250,
            max_attempts: 3,
        };
        let policy = ReconnectPolicy::from(&settings);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, 3);
    }
}
