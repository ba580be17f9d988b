use std::time::Duration;

use crate::WatchConfig;

/// Reconnect delay that doubles on every consecutive failure up to a cap,
/// and returns to its initial value once a watch is established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl RetryBackoff {
    pub fn new(
        initial: Duration,
        max: Duration,
    ) -> Self {
        let max = max.max(initial);
        RetryBackoff {
            initial,
            max,
            current: initial,
        }
    }

    pub fn from_config(config: &WatchConfig) -> Self {
        Self::new(config.initial_retry_interval(), config.max_retry_interval())
    }

    /// Delay the next failure will wait.
    pub fn current(&self) -> Duration {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    /// Returns the delay to wait now and doubles the following one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }
}

impl Default for RetryBackoff {
    fn default() -> Self {
        Self::from_config(&WatchConfig::default())
    }
}
