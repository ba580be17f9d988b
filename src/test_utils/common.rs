use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::ChangeLog;
use crate::Endpoint;
use crate::LogRecord;
use crate::LruEntryCache;
use crate::ProxiedDirs;
use crate::Result;
use crate::UserName;
use crate::WatchConfig;

use super::FakeBinder;
use super::FakeProbe;

/// Change log that keeps records in memory.
#[derive(Default)]
pub(crate) struct MemChangeLog {
    pub records: Mutex<Vec<LogRecord>>,
    pub wiped: Mutex<Vec<UserName>>,
    pub flushes: AtomicUsize,
}

impl MemChangeLog {
    pub(crate) fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub(crate) fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

impl ChangeLog for MemChangeLog {
    fn append(
        &self,
        record: LogRecord,
    ) -> Result<()> {
        self.records.lock().push(record);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn wipe(
        &self,
        user: &UserName,
    ) -> Result<()> {
        self.wiped.lock().push(user.clone());
        Ok(())
    }
}

pub(crate) struct TestRegistry {
    pub proxied: ProxiedDirs,
    pub binder: Arc<FakeBinder>,
    pub probe: FakeProbe,
    pub cache: Arc<LruEntryCache>,
    pub log: Arc<MemChangeLog>,
}

/// Registry wired to a fake transport, an empty LRU and an in-memory log.
pub(crate) fn test_registry() -> TestRegistry {
    let (binder, probe) = FakeBinder::new();
    let cache = Arc::new(LruEntryCache::new(128));
    let log = Arc::new(MemChangeLog::default());
    let proxied = ProxiedDirs::new(
        WatchConfig::default(),
        binder.clone(),
        cache.clone(),
        log.clone(),
    );
    TestRegistry {
        proxied,
        binder,
        probe,
        cache,
        log,
    }
}

pub(crate) fn ep(addr: &str) -> Endpoint {
    Endpoint::remote(addr)
}

pub(crate) fn user(name: &str) -> UserName {
    UserName::parse(name).unwrap()
}

/// Lets spawned tasks run until `cond` holds, advancing paused time in small
/// steps. Panics after `limit`.
pub(crate) async fn eventually<F, Fut>(
    limit: Duration,
    mut cond: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let step = Duration::from_millis(1);
    let mut waited = Duration::ZERO;
    while !cond().await {
        assert!(waited < limit, "condition not reached within {:?}", limit);
        tokio::time::sleep(step).await;
        waited += step;
    }
}
