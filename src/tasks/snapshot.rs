//! Snapshot Save Task
//!
//! Background task that periodically persists the full store to disk.
//! Saves are best-effort: failures are logged and the cache keeps serving.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::Group;

/// Spawns a background task saving the group's snapshot on a fixed timer.
///
/// The serialization and file write run on the blocking pool so the timer
/// task never stalls the runtime.
///
/// # Arguments
/// * `group` - shared handle to the persisted group
/// * `interval_secs` - seconds between saves
/// * `path` - snapshot file, overwritten on every save
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_snapshot_task(
    group: Arc<Group>,
    interval_secs: u64,
    path: PathBuf,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            group = %group.name(),
            interval_secs,
            path = %path.display(),
            "starting snapshot save task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let g = group.clone();
            let p = path.clone();
            match tokio::task::spawn_blocking(move || g.save_snapshot(&p)).await {
                Ok(Ok(entries)) => {
                    info!(group = %group.name(), entries, "snapshot saved");
                }
                Ok(Err(err)) => {
                    warn!(group = %group.name(), error = %err, "snapshot save failed");
                }
                Err(err) => {
                    warn!(group = %group.name(), error = %err, "snapshot save task panicked");
                }
            }
        }
    })
}
