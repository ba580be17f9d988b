use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::debug;
use tracing::trace;

use crate::constants::ORDER_REREAD;
use crate::metrics::WATCH_EVENTS_APPLIED_METRIC;
use crate::path;
use crate::CacheKey;
use crate::ChangeLog;
use crate::EntryCache;
use crate::Event;
use crate::LogOp;
use crate::LogRecord;
use crate::UserName;
use crate::WatchError;

/// Applies watch events for one user to the cache and change log.
///
/// Only events that touch something the cache already holds are applied.
/// Access files always are, since one never seen before can change
/// decisions the cache made.
pub(crate) struct EventFilter {
    user: UserName,
    order: Arc<AtomicI64>,
    cache: Arc<dyn EntryCache>,
    log: Arc<dyn ChangeLog>,
    /// The user was already wiped for the reread of the current session.
    wiped: bool,
}

impl EventFilter {
    pub(crate) fn new(
        user: UserName,
        order: Arc<AtomicI64>,
        cache: Arc<dyn EntryCache>,
        log: Arc<dyn ChangeLog>,
    ) -> Self {
        EventFilter {
            user,
            order,
            cache,
            log,
            wiped: false,
        }
    }

    /// Called once a new stream is up. A reread on it wipes the user again.
    pub(crate) fn start_session(&mut self) {
        self.wiped = false;
    }

    pub(crate) fn handle_event(
        &mut self,
        event: &Event,
    ) -> Result<(), WatchError> {
        if let Some(err) = &event.error {
            return Err(err.clone());
        }

        // A full reread is arriving; everything known about this user is
        // stale. Once per stream is enough.
        if !self.wiped && self.order.load(Ordering::Acquire) == ORDER_REREAD {
            self.cache.wipe(&self.user);
            self.log
                .wipe(&self.user)
                .map_err(|e| WatchError::LogFlush(e.to_string()))?;
            self.wiped = true;
        }
        trace!(user = %self.user, name = %event.entry.name, order = event.order, delete = event.delete, "watch event");

        if !self.is_relevant(&event.entry.name) {
            return Ok(());
        }

        let op = if event.delete { LogOp::Delete } else { LogOp::Lookup };
        self.log
            .append(LogRecord::new(
                op,
                event.entry.name.clone(),
                Some(event.entry.clone()),
                event.order,
            ))
            .map_err(|e| WatchError::LogFlush(e.to_string()))?;
        self.log.flush().map_err(|e| WatchError::LogFlush(e.to_string()))?;
        self.order.store(event.order, Ordering::Release);

        WATCH_EVENTS_APPLIED_METRIC
            .with_label_values(&[self.user.as_str()])
            .inc();
        debug!(user = %self.user, name = %event.entry.name, order = event.order, ?op, "applied watch event");
        Ok(())
    }

    fn is_relevant(
        &self,
        name: &str,
    ) -> bool {
        if path::is_access_file(name) {
            return true;
        }
        if self.cache.get(&CacheKey::exact(name)).is_some() {
            return true;
        }

        // Not a file we hold; how about a directory we hold?
        let dir = path::drop_path(name, 1);
        if dir == name {
            return false;
        }
        self.cache.get(&CacheKey::glob(dir)).is_some()
    }
}
