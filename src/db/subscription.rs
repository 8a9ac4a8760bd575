//! Live queries over the local stores.
//!
//! Every store table that can be observed owns a [`ChangeFeed`]. Writers bump it after
//! each successful change; a [`LiveQuery`] waits on the feed and re-runs its query,
//! so observers always receive the full current list rather than deltas.

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, Stream};
use tokio::sync::watch;

use crate::error::AppResult;

/// Version counter shared between a store and its live queries
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    version: Arc<watch::Sender<u64>>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            version: Arc::new(tx),
        }
    }

    /// Marks the underlying table as changed
    pub fn notify(&self) {
        self.version.send_modify(|version| *version = version.wrapping_add(1));
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}

type Snapshot<T> = Arc<dyn Fn() -> BoxFuture<'static, AppResult<Vec<T>>> + Send + Sync>;

/// Observer producing a fresh snapshot on every change. Drop it to detach.
pub struct LiveQuery<T> {
    changes: watch::Receiver<u64>,
    snapshot: Snapshot<T>,
    primed: bool,
}

impl<T> std::fmt::Debug for LiveQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveQuery")
            .field("version", &*self.changes.borrow())
            .field("primed", &self.primed)
            .finish()
    }
}

impl<T: Send + 'static> LiveQuery<T> {
    pub fn new<F, Fut>(feed: &ChangeFeed, snapshot: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Vec<T>>> + Send + 'static,
    {
        Self {
            changes: feed.subscribe(),
            snapshot: Arc::new(move || snapshot().boxed()),
            primed: false,
        }
    }

    /// Waits for the next snapshot
    ///
    /// The first call resolves immediately with the current list. Later calls resolve
    /// after the next change; several changes in between collapse into one snapshot.
    /// Returns `None` once the owning store is gone.
    pub async fn next(&mut self) -> Option<AppResult<Vec<T>>> {
        if self.primed {
            if self.changes.changed().await.is_err() {
                return None;
            }
        } else {
            self.primed = true;
        }
        let _ = self.changes.borrow_and_update();

        Some((self.snapshot)().await)
    }

    pub fn into_stream(self) -> impl Stream<Item = AppResult<Vec<T>>> + Send {
        stream::unfold(self, |mut query| async move {
            let item = query.next().await?;
            Some((item, query))
        })
    }
}
