use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{db::ShowCacheStore, error::AppResult};

/// Deletes cached shows last written more than `max_age` ago
pub async fn evict_stale_shows(
    cache: &dyn ShowCacheStore,
    max_age: chrono::Duration,
) -> AppResult<u64> {
    let cutoff = Utc::now()
        .checked_sub_signed(max_age)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let removed = cache.evict_older_than(cutoff).await?;

    tracing::info!(removed, cutoff = %cutoff, "Evicted stale cached shows");
    Ok(removed)
}

/// Handle for stopping the periodic eviction task
pub struct EvictionHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl EvictionHandle {
    /// Signals the task and waits until it has exited
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache eviction task did not exit cleanly");
        }
    }
}

/// Runs `evict_stale_shows` every `interval` until the handle is shut down
pub fn spawn_periodic_eviction(
    cache: Arc<dyn ShowCacheStore>,
    max_age: chrono::Duration,
    interval: Duration,
) -> EvictionHandle {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = evict_stale_shows(cache.as_ref(), max_age).await {
                        tracing::error!(error = %e, "Cache eviction failed");
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Cache eviction task stopped");
                    break;
                }
            }
        }
    });

    EvictionHandle { shutdown_tx, task }
}
