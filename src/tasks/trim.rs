//! Periodic Trim Task
//!
//! Background worker that applies the memory cache's configured limits at
//! a fixed cadence, independent of foreground `set`/`get` traffic.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::memory::MemoryCache;

/// Spawns a background task that periodically trims the memory cache.
///
/// Each cycle sleeps for the cache's `auto_trim_interval` (re-read every
/// round, so setter changes take effect without a restart) and then
/// applies the cost, count, and age limits, in that order.
///
/// # Arguments
/// * `cache` - Shared reference to the cache to trim
///
/// # Returns
/// A JoinHandle for the spawned task, which the owner can `abort`
/// during shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(MemoryCache::<String>::new());
/// let trim_handle = spawn_trim_task(cache.clone());
/// // Later, during shutdown:
/// trim_handle.abort();
/// ```
pub fn spawn_trim_task<T>(cache: Arc<MemoryCache<T>>) -> JoinHandle<()>
where
    T: Clone + Send + 'static,
{
    tokio::spawn(async move {
        info!("starting periodic trim task");

        loop {
            let interval = cache.auto_trim_interval();
            tokio::time::sleep(interval).await;

            let before = cache.total_count();
            cache.auto_trim();
            let after = cache.total_count();

            if before != after {
                info!(evicted = before - after, "periodic trim evicted entries");
            } else {
                debug!("periodic trim found nothing to evict");
            }
        }
    })
}
