use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use super::DirBinder;
use super::EventFilter;
use super::RetryBackoff;
use crate::constants::ORDER_REREAD;
use crate::constants::ORDER_UNKNOWN;
use crate::metrics::ACTIVE_WATCHERS_METRIC;
use crate::metrics::WATCH_RETRIES_METRIC;
use crate::metrics::WATCH_SESSIONS_METRIC;
use crate::Endpoint;
use crate::UserName;
use crate::WatchError;

/// Keeps one user's directory watched on one endpoint until told to die.
///
/// `order` is written only by the watcher while it runs. `_dying` is dropped
/// when the watcher is, which is how the registry learns it has exited.
pub(crate) struct DirWatcher {
    user: UserName,
    endpoint: Endpoint,
    order: Arc<AtomicI64>,
    backoff: RetryBackoff,
    binder: Arc<dyn DirBinder>,
    filter: EventFilter,
    die: CancellationToken,
    _dying: oneshot::Sender<()>,
}

impl DirWatcher {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        user: UserName,
        endpoint: Endpoint,
        order: Arc<AtomicI64>,
        backoff: RetryBackoff,
        binder: Arc<dyn DirBinder>,
        filter: EventFilter,
        die: CancellationToken,
        dying: oneshot::Sender<()>,
    ) -> Self {
        ACTIVE_WATCHERS_METRIC.inc();
        DirWatcher {
            user,
            endpoint,
            order,
            backoff,
            binder,
            filter,
            die,
            _dying: dying,
        }
    }

    pub(crate) async fn run(mut self) {
        debug!(user = %self.user, endpoint = %self.endpoint, "dircache watcher starting");

        // Without a known order, reread the whole state. It is shorter than
        // the history of every operation.
        if self.order.load(Ordering::Acquire) == ORDER_UNKNOWN {
            self.order.store(ORDER_REREAD, Ordering::Release);
        }

        self.backoff.reset();
        loop {
            let err = match self.watch().await {
                Ok(()) => {
                    debug!(user = %self.user, endpoint = %self.endpoint, "dircache watcher exiting");
                    return;
                }
                Err(e) => e,
            };
            if err == WatchError::NotSupported {
                debug!(user = %self.user, endpoint = %self.endpoint, "dircache watcher: {}", err);
                return;
            }
            if err.is_order_out_of_range() {
                self.order.store(ORDER_REREAD, Ordering::Release);
            }
            info!(user = %self.user, endpoint = %self.endpoint, "dircache watcher: {}", err);
            WATCH_RETRIES_METRIC.with_label_values(&[self.user.as_str()]).inc();

            let delay = self.backoff.next_delay();
            tokio::select! {
                biased;
                _ = self.die.cancelled() => {
                    debug!(user = %self.user, "dircache watcher told to die while backing off");
                    return;
                }
                _ = sleep(delay) => {}
            }
        }
    }

    /// One watch session. Returns `Ok` only when told to die.
    ///
    /// Binding and starting the stream race against `die`, so a transport
    /// that never answers cannot keep the watcher alive.
    async fn watch(&mut self) -> Result<(), WatchError> {
        let server = tokio::select! {
            biased;
            _ = self.die.cancelled() => return Ok(()),
            server = self.binder.dir_server(&self.endpoint) => server?,
        };

        let done = CancellationToken::new();
        let _done_guard = done.clone().drop_guard();
        let root = self.user.root();
        let order = self.order.load(Ordering::Acquire);
        let mut events = tokio::select! {
            biased;
            _ = self.die.cancelled() => return Ok(()),
            events = server.watch(&root, order, done) => events?,
        };
        self.filter.start_session();

        // The watch is up; the next failure starts backing off from scratch.
        self.backoff.reset();
        WATCH_SESSIONS_METRIC.with_label_values(&[self.user.as_str()]).inc();
        debug!(user = %self.user, endpoint = %self.endpoint, order, "watch started");

        loop {
            tokio::select! {
                biased;
                _ = self.die.cancelled() => return Ok(()),
                event = events.recv() => match event {
                    None => return Err(WatchError::StreamClosed),
                    Some(event) => self.filter.handle_event(&event)?,
                },
            }
        }
    }
}

impl Drop for DirWatcher {
    fn drop(&mut self) {
        ACTIVE_WATCHERS_METRIC.dec();
    }
}
