//! Staleness Scan Task
//!
//! Background task that periodically refreshes the oldest stale entries
//! from upstream and publishes entries past the expiry threshold onto the
//! miss queue for peer resolution.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Group;

/// Spawns a background task running the staleness scan on a fixed timer.
///
/// Each pass refreshes up to `batch` entries at least `stale_minutes` old,
/// then publishes up to `batch` entries past the group's expiry threshold.
/// The selection holds the store lock; the refetches do not.
///
/// # Arguments
/// * `group` - shared handle to the scanned group
/// * `interval_secs` - seconds between scan passes
/// * `batch` - maximum entries refreshed or published per pass
/// * `stale_minutes` - minimum age for refresh selection
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_refresh_task(
    group: Arc<Group>,
    interval_secs: u64,
    batch: usize,
    stale_minutes: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            group = %group.name(),
            interval_secs,
            batch,
            stale_minutes,
            "starting staleness scan task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let refreshed = group.refresh_stale(batch, stale_minutes).await;
            let published = group.publish_expired(batch);

            if refreshed == 0 && published == 0 {
                debug!(group = %group.name(), "staleness scan: nothing to do");
            }
        }
    })
}
