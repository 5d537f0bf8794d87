//! Remote Fill Task
//!
//! Cooperating-peer loop: pull one missed key from a peer's missed
//! endpoint, resolve it through the local loader, and POST the value back
//! to the peer's update endpoint. Two processes sharing one upstream split
//! the fetch burden this way.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::loader::Loader;
use crate::models::UpdateRequest;

// == Peer Client ==
/// HTTP client for one peer's cache endpoints.
pub struct PeerClient {
    client: reqwest::Client,
    missed_url: String,
    update_url: String,
}

impl PeerClient {
    /// Builds a client for `group` on the peer at `base_url`.
    pub fn new(base_url: &str, group: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = base_url.trim_end_matches('/');
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            missed_url: format!("{}/cache/{}?missed=1", base, group),
            update_url: format!("{}/cache/{}", base, group),
        })
    }

    /// Asks the peer for one unresolved key. `None` when nothing is pending.
    pub async fn fetch_missed(&self) -> anyhow::Result<Option<String>> {
        let response = self.client.get(&self.missed_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("missed endpoint returned status {}", status);
        }

        let key = response.text().await?;
        if key.is_empty() {
            Ok(None)
        } else {
            Ok(Some(key))
        }
    }

    /// Sends a resolved value back for the peer to populate.
    pub async fn push_value(&self, key: &str, value: String) -> anyhow::Result<()> {
        let request = UpdateRequest {
            key: key.to_string(),
            value,
        };
        let response = self
            .client
            .post(&self.update_url)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("update endpoint returned status {}", status);
        }
        Ok(())
    }
}

// == Fill Pass ==
/// One pull-resolve-push cycle. Returns whether a key was resolved.
pub async fn fill_one(loader: &dyn Loader, peer: &PeerClient) -> anyhow::Result<bool> {
    let Some(key) = peer.fetch_missed().await? else {
        return Ok(false);
    };

    let bytes = loader.load(&key).await?;
    peer.push_value(&key, String::from_utf8_lossy(&bytes).into_owned())
        .await?;
    info!(key, "remote miss resolved");
    Ok(true)
}

// == Task ==
/// Spawns the remote fill loop.
///
/// Keys are pulled back-to-back while the peer has them; when the peer
/// reports none pending (or a cycle fails), the loop backs off for
/// `idle_backoff_secs` before polling again.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_remote_fill_task(
    loader: Arc<dyn Loader>,
    peer: PeerClient,
    idle_backoff_secs: u64,
) -> JoinHandle<()> {
    let backoff = Duration::from_secs(idle_backoff_secs);

    tokio::spawn(async move {
        info!(idle_backoff_secs, "starting remote fill task");

        loop {
            match fill_one(loader.as_ref(), &peer).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!("peer has no missed keys, backing off");
                    tokio::time::sleep(backoff).await;
                }
                Err(err) => {
                    warn!(error = %err, "remote fill cycle failed");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    })
}
