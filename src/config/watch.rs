use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::INITIAL_RETRY_INTERVAL;
use crate::constants::MAX_RETRY_INTERVAL;
use crate::Error;
use crate::Result;

/// Watcher parameters
///
/// ```toml
/// [watch]
/// initial_retry_interval_ms = 10000
/// max_retry_interval_ms = 60000
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WatchConfig {
    /// Delay before the first reconnect after a failed session.
    /// Also the value the delay returns to once a watch starts.
    #[serde(default = "default_initial_retry_interval_ms")]
    pub initial_retry_interval_ms: u64,

    /// Upper bound of the doubling reconnect delay
    #[serde(default = "default_max_retry_interval_ms")]
    pub max_retry_interval_ms: u64,
}

fn default_initial_retry_interval_ms() -> u64 {
    INITIAL_RETRY_INTERVAL.as_millis() as u64
}

fn default_max_retry_interval_ms() -> u64 {
    MAX_RETRY_INTERVAL.as_millis() as u64
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            initial_retry_interval_ms: default_initial_retry_interval_ms(),
            max_retry_interval_ms: default_max_retry_interval_ms(),
        }
    }
}

impl WatchConfig {
    pub fn initial_retry_interval(&self) -> Duration {
        Duration::from_millis(self.initial_retry_interval_ms)
    }

    pub fn max_retry_interval(&self) -> Duration {
        Duration::from_millis(self.max_retry_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_retry_interval_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.initial_retry_interval_ms must be greater than 0".into(),
            )));
        }
        if self.max_retry_interval_ms < self.initial_retry_interval_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "watch.max_retry_interval_ms ({}) must be >= initial_retry_interval_ms ({})",
                self.max_retry_interval_ms, self.initial_retry_interval_ms
            ))));
        }
        Ok(())
    }
}
