//! Scripted in-memory directory servers for watcher and registry tests.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::DirBinder;
use crate::DirServer;
use crate::Endpoint;
use crate::Event;
use crate::WatchError;

#[derive(Debug, Clone)]
pub(crate) struct BindCall {
    pub endpoint: Endpoint,
    pub at: Instant,
}

#[derive(Debug, Clone)]
pub(crate) struct WatchCall {
    pub endpoint: Endpoint,
    pub root: String,
    pub order: i64,
    pub done: CancellationToken,
    pub at: Instant,
}

/// Receives every bind and watch call made against a [`FakeBinder`].
pub(crate) struct FakeProbe {
    pub binds: mpsc::UnboundedReceiver<BindCall>,
    pub watches: mpsc::UnboundedReceiver<WatchCall>,
}

impl FakeProbe {
    pub(crate) async fn next_bind(&mut self) -> BindCall {
        self.binds.recv().await.expect("fake binder dropped")
    }

    pub(crate) async fn next_watch(&mut self) -> WatchCall {
        self.watches.recv().await.expect("fake binder dropped")
    }
}

pub(crate) struct FakeBinder {
    bind_failures: AtomicUsize,
    hang: AtomicBool,
    servers: Mutex<HashMap<Endpoint, Arc<FakeDirServer>>>,
    bind_tx: mpsc::UnboundedSender<BindCall>,
    watch_tx: mpsc::UnboundedSender<WatchCall>,
}

impl FakeBinder {
    pub(crate) fn new() -> (Arc<Self>, FakeProbe) {
        let (bind_tx, binds) = mpsc::unbounded_channel();
        let (watch_tx, watches) = mpsc::unbounded_channel();
        let binder = Arc::new(FakeBinder {
            bind_failures: AtomicUsize::new(0),
            hang: AtomicBool::new(false),
            servers: Mutex::new(HashMap::new()),
            bind_tx,
            watch_tx,
        });
        (binder, FakeProbe { binds, watches })
    }

    /// Makes the next `n` binds fail.
    pub(crate) fn fail_binds(
        &self,
        n: usize,
    ) {
        self.bind_failures.store(n, Ordering::SeqCst);
    }

    /// Makes every later bind stay pending forever.
    pub(crate) fn hang_binds(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub(crate) fn server(
        &self,
        endpoint: &Endpoint,
    ) -> Arc<FakeDirServer> {
        self.servers
            .lock()
            .entry(endpoint.clone())
            .or_insert_with(|| {
                Arc::new(FakeDirServer {
                    endpoint: endpoint.clone(),
                    watch_tx: self.watch_tx.clone(),
                    watch_errors: Mutex::new(VecDeque::new()),
                    hang: AtomicBool::new(false),
                    streams: Arc::new(Mutex::new(Vec::new())),
                })
            })
            .clone()
    }
}

#[async_trait]
impl DirBinder for FakeBinder {
    async fn dir_server(
        &self,
        endpoint: &Endpoint,
    ) -> Result<Arc<dyn DirServer>, WatchError> {
        let _ = self.bind_tx.send(BindCall {
            endpoint: endpoint.clone(),
            at: Instant::now(),
        });
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let failing = self
            .bind_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(WatchError::Bind {
                endpoint: endpoint.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.server(endpoint))
    }
}

pub(crate) struct FakeDirServer {
    endpoint: Endpoint,
    watch_tx: mpsc::UnboundedSender<WatchCall>,
    watch_errors: Mutex<VecDeque<WatchError>>,
    hang: AtomicBool,
    streams: Arc<Mutex<Vec<Option<mpsc::Sender<Event>>>>>,
}

impl FakeDirServer {
    /// The next watch call fails with `err` instead of opening a stream.
    pub(crate) fn fail_next_watch(
        &self,
        err: WatchError,
    ) {
        self.watch_errors.lock().push_back(err);
    }

    /// Makes every later watch call stay pending forever.
    pub(crate) fn hang_watches(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    /// Delivers `event` on the most recently opened stream.
    pub(crate) async fn send(
        &self,
        event: Event,
    ) {
        let tx = self
            .streams
            .lock()
            .last()
            .cloned()
            .flatten()
            .expect("no open watch stream");
        tx.send(event).await.expect("watcher dropped its stream");
    }

    /// Ends the most recently opened stream without an error.
    pub(crate) fn close_stream(&self) {
        if let Some(last) = self.streams.lock().last_mut() {
            last.take();
        }
    }

    pub(crate) fn open_streams(&self) -> usize {
        self.streams.lock().iter().filter(|s| s.is_some()).count()
    }
}

#[async_trait]
impl DirServer for FakeDirServer {
    async fn watch(
        &self,
        root: &str,
        order: i64,
        done: CancellationToken,
    ) -> Result<mpsc::Receiver<Event>, WatchError> {
        let _ = self.watch_tx.send(WatchCall {
            endpoint: self.endpoint.clone(),
            root: root.to_string(),
            order,
            done: done.clone(),
            at: Instant::now(),
        });
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if let Some(err) = self.watch_errors.lock().pop_front() {
            return Err(err);
        }

        let (tx, rx) = mpsc::channel(16);
        let index = {
            let mut streams = self.streams.lock();
            streams.push(Some(tx));
            streams.len() - 1
        };

        // Closing the stream once the watcher is done with it is part of the
        // transport contract.
        let streams = self.streams.clone();
        tokio::spawn(async move {
            done.cancelled().await;
            if let Some(slot) = streams.lock().get_mut(index) {
                slot.take();
            }
        });
        Ok(rx)
    }
}
