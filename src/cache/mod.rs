//! Query side of the directory entry cache.
//!
//! The watcher only needs to know whether a name (or its parent directory)
//! is currently cached, and to forget a user's entries when a full reread
//! of that user's tree is about to arrive.

mod lru_cache;
pub use lru_cache::*;


#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;

use crate::DirEntry;
use crate::UserName;

/// Cache key. `glob == true` marks a directory-scope entry covering
/// every child of `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub name: String,
    pub glob: bool,
}

impl CacheKey {
    pub fn exact(name: impl Into<String>) -> Self {
        CacheKey {
            name: name.into(),
            glob: false,
        }
    }

    pub fn glob(name: impl Into<String>) -> Self {
        CacheKey {
            name: name.into(),
            glob: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    /// `None` records a cached negative lookup.
    pub entry: Option<DirEntry>,
    pub order: i64,
}

#[cfg_attr(test, automock)]
pub trait EntryCache: Send + Sync + 'static {
    /// Looks up `key`, refreshing its recency.
    fn get(
        &self,
        key: &CacheKey,
    ) -> Option<CachedEntry>;

    /// Forgets every entry belonging to `user`.
    fn wipe(
        &self,
        user: &UserName,
    );
}
