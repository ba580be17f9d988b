//! Append-only change log for the directory cache.
//!
//! Every cache mutation the watcher applies is journaled here so that a
//! restarted cache can rebuild its LRU and resume each user's watch from
//! the last order it saw.

mod cache_log;
mod file_log;
pub use cache_log::*;
pub use file_log::*;


#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;

use crate::DirEntry;
use crate::Result;
use crate::UserName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogOp {
    /// Entry is present (insert or update)
    Lookup,
    /// Entry was removed
    Delete,
    /// Everything previously logged for the record's user is stale
    Wipe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub op: LogOp,
    pub name: String,
    pub entry: Option<DirEntry>,
    pub order: i64,
}

impl LogRecord {
    pub fn new(
        op: LogOp,
        name: impl Into<String>,
        entry: Option<DirEntry>,
        order: i64,
    ) -> Self {
        LogRecord {
            op,
            name: name.into(),
            entry,
            order,
        }
    }
}

#[cfg_attr(test, automock)]
pub trait ChangeLog: Send + Sync + 'static {
    /// Records a mutation. Implementations that front a cache apply it there too.
    fn append(
        &self,
        record: LogRecord,
    ) -> Result<()>;

    /// Makes every appended record durable.
    fn flush(&self) -> Result<()>;

    /// Marks everything logged so far for `user` as stale.
    fn wipe(
        &self,
        user: &UserName,
    ) -> Result<()>;
}
