use std::time::Duration;

// -
// Watch orders

/// No order is known for the directory; the watcher will ask for a full reread.
pub const ORDER_UNKNOWN: i64 = 0;

/// Ask the server to resend the full current state before streaming changes.
pub const ORDER_REREAD: i64 = -1;

// -
// Retry intervals

pub(crate) const INITIAL_RETRY_INTERVAL: Duration = Duration::from_secs(10);
pub(crate) const MAX_RETRY_INTERVAL: Duration = Duration::from_secs(60);

/// Substring servers use when a requested order is no longer in their log.
pub(crate) const CANNOT_READ_LOG_AT_ORDER: &str = "cannot read log at order";

// -
// Paths

/// Name of the per-directory access control file.
pub const ACCESS_FILE: &str = "Access";

// -
// Change log

pub(crate) const DEFAULT_LOG_DIR: &str = "./db/dircache";
pub(crate) const DEFAULT_LOG_FILE_NAME: &str = "dircache.log";
