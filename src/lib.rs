//! # dircache
//!
//! Proxied directory-watch cache coordinator.
//!
//! For each remote user directory the cache has looked at, [`ProxiedDirs`]
//! keeps exactly one background watcher subscribed to that directory
//! server's change stream. Relevant changes are applied to the shared
//! [`EntryCache`] and journaled to the [`ChangeLog`]; failures are retried
//! with a bounded exponential backoff and the watch resumes from the last
//! order seen.
//!
//! ```ignore
//! let config = DirCacheConfig::new()?.validate()?;
//! let cache = Arc::new(CacheLog::open(&config.cache)?);
//! let proxied = ProxiedDirs::new(config.watch.clone(), binder, cache.clone(), cache.clone());
//! cache.restore_orders(&proxied).await;
//!
//! proxied.proxy_for("alice@example.com/docs/plan", &endpoint).await;
//! // ...
//! proxied.close().await;
//! ```

mod cache;
mod clog;
mod config;
pub mod constants;
mod errors;
pub mod metrics;
pub mod path;
mod proxied;
mod types;
pub mod utils;
mod watch;

pub use cache::*;
pub use clog::*;
pub use config::*;
pub use constants::ORDER_REREAD;
pub use constants::ORDER_UNKNOWN;
pub use errors::*;
pub use path::UserName;
pub use proxied::*;
pub use types::*;
pub use watch::*;


//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub(crate) mod test_utils;
