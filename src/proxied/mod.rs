//! Registry of proxied user directories.
//!
//! For every user whose directory server the cache talks to, the registry
//! keeps at most one watcher alive. Watchers are started on first interest,
//! replaced when the user's endpoint changes, and all stopped on `close`.
//!
//! All state lives under one async mutex. Stopping a watcher waits for its
//! exit notification while holding that mutex; watchers never call back
//! into the registry, so this cannot deadlock.


use std::collections::HashMap;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::constants::ORDER_UNKNOWN;
use crate::path;
use crate::ChangeLog;
use crate::DirBinder;
use crate::DirWatcher;
use crate::Endpoint;
use crate::EntryCache;
use crate::EventFilter;
use crate::RetryBackoff;
use crate::UserName;
use crate::WatchConfig;

/// Point-in-time view of one proxied directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedDirStatus {
    pub endpoint: Option<Endpoint>,
    pub order: i64,
    pub last_access: Option<Instant>,
    /// A watcher task is running for this directory.
    pub watching: bool,
}

/// State kept for one proxied user directory.
struct ProxiedDir {
    user: UserName,
    /// Absent for directories only known from log replay.
    endpoint: Option<Endpoint>,
    /// Last order seen. Written here only while no watcher runs.
    order: Arc<AtomicI64>,
    /// Last `proxy_for`. Kept for a future idle-eviction pass.
    last_access: Option<Instant>,
    /// Cancelled to tell the watcher to exit. `None` iff no watcher was started.
    die: Option<CancellationToken>,
    /// Resolves once the watcher has exited.
    dying: Option<oneshot::Receiver<()>>,
}

impl ProxiedDir {
    fn new(user: UserName) -> Self {
        ProxiedDir {
            user,
            endpoint: None,
            order: Arc::new(AtomicI64::new(ORDER_UNKNOWN)),
            last_access: None,
            die: None,
            dying: None,
        }
    }

    /// Stops the watcher, if any, and waits for it to exit.
    async fn close(&mut self) {
        if let Some(die) = self.die.take() {
            die.cancel();
            if let Some(dying) = self.dying.take() {
                // The sender is never used; the watcher dropping it is the signal.
                let _ = dying.await;
            }
            debug!(user = %self.user, "watcher stopped");
        }
    }

    /// Whether the watcher is still running.
    ///
    /// An exited watcher's receiver is dropped, since it cannot be polled
    /// again. `die` stays set so the dead watcher is not restarted on the
    /// same endpoint.
    fn watching(&mut self) -> bool {
        let Some(dying) = self.dying.as_mut() else {
            return false;
        };
        match dying.try_recv() {
            Err(TryRecvError::Empty) => true,
            _ => {
                self.dying = None;
                false
            }
        }
    }
}

struct Inner {
    /// Once set, no new watchers are started.
    closing: bool,
    dirs: HashMap<UserName, ProxiedDir>,
}

/// Maps user names to their proxied directory and its watcher.
pub struct ProxiedDirs {
    inner: Mutex<Inner>,
    config: WatchConfig,
    binder: Arc<dyn DirBinder>,
    cache: Arc<dyn EntryCache>,
    log: Arc<dyn ChangeLog>,
}

impl ProxiedDirs {
    pub fn new(
        config: WatchConfig,
        binder: Arc<dyn DirBinder>,
        cache: Arc<dyn EntryCache>,
        log: Arc<dyn ChangeLog>,
    ) -> Self {
        ProxiedDirs {
            inner: Mutex::new(Inner {
                closing: false,
                dirs: HashMap::new(),
            }),
            config,
            binder,
            cache,
            log,
        }
    }

    /// Terminates all watchers and refuses to start new ones.
    ///
    /// Returns once every watcher has exited. Later calls do nothing.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        if inner.closing {
            return;
        }
        inner.closing = true;
        for dir in inner.dirs.values_mut() {
            dir.close().await;
        }
        info!(dirs = inner.dirs.len(), "proxied directories closed");
    }

    /// Records `endpoint` as the server for the user owning `name` and makes
    /// sure that server is being watched.
    ///
    /// A changed endpoint stops the current watcher before a new one starts.
    pub async fn proxy_for(
        &self,
        name: &str,
        endpoint: &Endpoint,
    ) {
        let mut inner = self.inner.lock().await;
        if inner.closing {
            return;
        }

        let parsed = match path::parse(name) {
            Ok(parsed) => parsed,
            Err(e) => {
                info!("parse error on a cleaned name: {}: {}", name, e);
                return;
            }
        };
        let user = parsed.user().clone();

        let dir = inner
            .dirs
            .entry(user.clone())
            .or_insert_with(|| ProxiedDir::new(user));

        if dir.endpoint.as_ref() != Some(endpoint) {
            dir.close().await;
            dir.endpoint = Some(endpoint.clone());
        }

        dir.last_access = Some(Instant::now());

        if dir.die.is_none() {
            self.start_watcher(dir, endpoint.clone());
        }
    }

    /// Remembers `order` as the last order seen for the user owning `name`.
    ///
    /// Meant for log replay before any watcher starts. Ignored while a
    /// watcher owns the order.
    pub async fn set_order(
        &self,
        name: &str,
        order: i64,
    ) {
        let mut inner = self.inner.lock().await;
        if inner.closing {
            return;
        }

        let parsed = match path::parse(name) {
            Ok(parsed) => parsed,
            Err(e) => {
                info!("parse error on a cleaned name: {}: {}", name, e);
                return;
            }
        };
        let user = parsed.user().clone();

        let dir = inner
            .dirs
            .entry(user.clone())
            .or_insert_with(|| ProxiedDir::new(user));
        if dir.die.is_some() {
            warn!(user = %dir.user, order, "ignoring order for a directory being watched");
            return;
        }
        dir.order.store(order, Ordering::Release);
    }

    pub async fn status(
        &self,
        user: &UserName,
    ) -> Option<ProxiedDirStatus> {
        let mut inner = self.inner.lock().await;
        let dir = inner.dirs.get_mut(user)?;
        Some(ProxiedDirStatus {
            endpoint: dir.endpoint.clone(),
            order: dir.order.load(Ordering::Acquire),
            last_access: dir.last_access,
            watching: dir.watching(),
        })
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.dirs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn start_watcher(
        &self,
        dir: &mut ProxiedDir,
        endpoint: Endpoint,
    ) {
        let die = CancellationToken::new();
        let (dying_tx, dying_rx) = oneshot::channel();

        let filter = EventFilter::new(
            dir.user.clone(),
            dir.order.clone(),
            self.cache.clone(),
            self.log.clone(),
        );
        let watcher = DirWatcher::new(
            dir.user.clone(),
            endpoint,
            dir.order.clone(),
            RetryBackoff::from_config(&self.config),
            self.binder.clone(),
            filter,
            die.clone(),
            dying_tx,
        );
        tokio::spawn(watcher.run());

        dir.die = Some(die);
        dir.dying = Some(dying_rx);
    }
}

impl Drop for ProxiedDirs {
    fn drop(&mut self) {
        // Without a `close`, still stop every watcher; nobody is left to wait.
        for dir in self.inner.get_mut().dirs.values() {
            if let Some(die) = &dir.die {
                die.cancel();
            }
        }
    }
}
