use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use super::validate_directory;
use crate::constants::DEFAULT_LOG_DIR;
use crate::constants::DEFAULT_LOG_FILE_NAME;
use crate::Error;
use crate::Result;

/// Cache and change log parameters
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries held by the LRU
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Directory holding the change log
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// File name of the change log inside `log_dir`
    #[serde(default = "default_log_file_name")]
    pub log_file_name: String,
}

fn default_capacity() -> usize {
    10_000
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

fn default_log_file_name() -> String {
    DEFAULT_LOG_FILE_NAME.to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            log_dir: default_log_dir(),
            log_file_name: default_log_file_name(),
        }
    }
}

impl CacheConfig {
    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file_name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::Config(ConfigError::Message(
                "cache.capacity must be greater than 0".into(),
            )));
        }
        if self.log_file_name.is_empty() || self.log_file_name.contains('/') {
            return Err(Error::Config(ConfigError::Message(format!(
                "cache.log_file_name {:?} must be a plain file name",
                self.log_file_name
            ))));
        }
        validate_directory(&self.log_dir, "cache.log_dir")
    }
}
