//! Directory Cache Error Hierarchy
//!
//! Errors are split by the layer that produces them: the watch transport,
//! the on-disk change log, path parsing and configuration. Watch errors never
//! reach callers of the registry; they are consumed by the watcher loop.

use std::path::PathBuf;

use config::ConfigError;

use crate::constants::CANNOT_READ_LOG_AT_ORDER;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failures talking to a directory server
    #[error(transparent)]
    Watch(#[from] WatchError),

    /// Change log persistence failures
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Malformed user or path names
    #[error(transparent)]
    Path(#[from] PathError),

    /// Configuration loading or validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unrecoverable failures
    #[error("Fatal error: {0}")]
    Fatal(String),
}

/// Errors produced while binding to or watching a directory server.
///
/// Carried inside [`crate::Event`]s as well, so it is cheap to clone and
/// comparable in tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WatchError {
    /// The server will never support watching. Terminal for the watcher.
    #[error("watch not supported")]
    NotSupported,

    /// The server no longer has the requested order in its log
    #[error("cannot read log at order {order}")]
    CannotReadLog { order: i64 },

    /// Could not reach the directory server behind an endpoint
    #[error("bind to {endpoint} failed: {reason}")]
    Bind { endpoint: String, reason: String },

    /// The event stream ended without an explicit error
    #[error("Watch event stream closed")]
    StreamClosed,

    /// Free-form transport failure reported by the server
    #[error("{0}")]
    Transport(String),

    /// The change log could not be flushed after applying an event
    #[error("change log flush failed: {0}")]
    LogFlush(String),
}

impl WatchError {
    /// Whether the server rejected the requested order.
    ///
    /// Matches the typed variant and, for servers that only report text,
    /// the message they use for the same condition.
    pub fn is_order_out_of_range(&self) -> bool {
        match self {
            WatchError::CannotReadLog { .. } => true,
            WatchError::NotSupported | WatchError::StreamClosed => false,
            other => other.to_string().contains(CANNOT_READ_LOG_AT_ORDER),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Disk I/O failures on the change log
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// I/O failure tied to a specific file
    #[error("Error occurred at path: {path}")]
    PathError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization failures for log records
    #[error(transparent)]
    BincodeError(#[from] bincode::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("empty path name")]
    Empty,

    #[error("user name {0:?} has no @ sign")]
    MissingAt(String),

    #[error("user name {0:?} has an empty user or domain")]
    BadUserName(String),

    #[error("path {0:?} contains an empty or relative element")]
    BadElement(String),
}
