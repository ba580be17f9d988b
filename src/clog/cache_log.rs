use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;
use tracing::warn;

use super::ChangeLog;
use super::FileChangeLog;
use super::LogOp;
use super::LogRecord;
use crate::path;
use crate::CacheConfig;
use crate::CacheKey;
use crate::CachedEntry;
use crate::EntryCache;
use crate::LruEntryCache;
use crate::ProxiedDirs;
use crate::Result;
use crate::UserName;

/// LRU of directory entries journaled to a [`FileChangeLog`].
///
/// Appending a record to the log also applies it to the LRU, so one call
/// both mutates the cache and journals the mutation.
pub struct CacheLog {
    lru: Arc<LruEntryCache>,
    log: FileChangeLog,
    resume_orders: BTreeMap<UserName, i64>,
}

impl CacheLog {
    /// Rebuilds the cache from the log at `config.log_path()` and reopens
    /// the log for appending.
    pub fn open(config: &CacheConfig) -> Result<Self> {
        let log_path = config.log_path();
        let records = FileChangeLog::replay(&log_path)?;
        let lru = Arc::new(LruEntryCache::new(config.capacity));

        let mut resume_orders: BTreeMap<UserName, i64> = BTreeMap::new();
        for record in &records {
            apply(&lru, record);

            let user = match path::parse(&record.name) {
                Ok(parsed) => parsed.user().clone(),
                Err(e) => {
                    warn!("skipping order of unparseable logged name {:?}: {}", record.name, e);
                    continue;
                }
            };
            match record.op {
                LogOp::Wipe => {
                    resume_orders.remove(&user);
                }
                LogOp::Lookup | LogOp::Delete => {
                    let order = resume_orders.entry(user).or_insert(record.order);
                    *order = (*order).max(record.order);
                }
            }
        }
        resume_orders.retain(|_, order| *order > 0);

        info!(
            path = %log_path.display(),
            records = records.len(),
            users = resume_orders.len(),
            "directory cache restored from change log"
        );

        let log = FileChangeLog::open(&log_path)?;
        Ok(CacheLog {
            lru,
            log,
            resume_orders,
        })
    }

    /// Highest order logged per user since that user's last wipe.
    pub fn resume_orders(&self) -> &BTreeMap<UserName, i64> {
        &self.resume_orders
    }

    /// Tells `proxied` where each user's watch should resume.
    ///
    /// Must run before any watcher is started.
    pub async fn restore_orders(
        &self,
        proxied: &ProxiedDirs,
    ) {
        for (user, order) in &self.resume_orders {
            proxied.set_order(&user.root(), *order).await;
        }
    }

    pub fn lru(&self) -> &Arc<LruEntryCache> {
        &self.lru
    }
}

fn apply(
    lru: &LruEntryCache,
    record: &LogRecord,
) {
    match record.op {
        LogOp::Lookup => lru.insert(
            CacheKey::exact(record.name.clone()),
            CachedEntry {
                entry: record.entry.clone(),
                order: record.order,
            },
        ),
        LogOp::Delete => {
            lru.remove(&CacheKey::exact(record.name.clone()));
            lru.remove(&CacheKey::glob(record.name.clone()));
        }
        LogOp::Wipe => {
            if let Ok(parsed) = path::parse(&record.name) {
                lru.wipe(parsed.user());
            }
        }
    }
}

impl EntryCache for CacheLog {
    fn get(
        &self,
        key: &CacheKey,
    ) -> Option<CachedEntry> {
        self.lru.get(key)
    }

    fn wipe(
        &self,
        user: &UserName,
    ) {
        self.lru.wipe(user);
    }
}

impl ChangeLog for CacheLog {
    fn append(
        &self,
        record: LogRecord,
    ) -> Result<()> {
        self.log.append(record.clone())?;
        apply(&self.lru, &record);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.log.flush()
    }

    fn wipe(
        &self,
        user: &UserName,
    ) -> Result<()> {
        self.log.wipe(user)
    }
}
