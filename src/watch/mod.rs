//! Watching remote directory servers.
//!
//! A [`DirBinder`] turns an [`Endpoint`] into a [`DirServer`], whose `watch`
//! call yields a stream of [`Event`]s for one user's tree. The watcher in
//! this module keeps one such stream alive per proxied user, reconnecting
//! with a bounded exponential backoff, and feeds each event through the
//! [`EventFilter`] into the cache and change log.

mod backoff;
mod filter;
mod watcher;
pub use backoff::*;
pub(crate) use filter::*;
pub(crate) use watcher::*;


use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::Endpoint;
use crate::Event;
use crate::WatchError;

/// Change stream of a directory server.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DirServer: Send + Sync + 'static {
    /// Starts streaming changes under `root`, beginning at `order`.
    ///
    /// `order` may be [`crate::ORDER_REREAD`] to receive the full current
    /// state first. The server must close the returned channel once `done`
    /// is cancelled. Servers that cannot watch return
    /// [`WatchError::NotSupported`].
    async fn watch(
        &self,
        root: &str,
        order: i64,
        done: CancellationToken,
    ) -> Result<mpsc::Receiver<Event>, WatchError>;
}

/// Resolves endpoints to directory servers.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DirBinder: Send + Sync + 'static {
    async fn dir_server(
        &self,
        endpoint: &Endpoint,
    ) -> Result<Arc<dyn DirServer>, WatchError>;
}
