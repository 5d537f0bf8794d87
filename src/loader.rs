//! Loader Module
//!
//! The upstream fetch capability injected at group construction. The core
//! treats it as an opaque, potentially slow, potentially failing
//! dependency; retry and backoff policy belong to the loader itself.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;

// == Loader Trait ==
/// Fetches the value for a key from upstream.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

// == Closure Adapter ==
/// Adapter so a plain function can serve as a loader.
pub struct LoaderFn<F>(pub F);

#[async_trait]
impl<F> Loader for LoaderFn<F>
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        (self.0)(key)
    }
}

// == HTTP Loader ==
/// Fetches the key as an upstream URL with a bounded per-request timeout.
///
/// The reference deployment caches per-URL quote payloads, so the cache
/// key doubles as the upstream address.
pub struct HttpLoader {
    client: reqwest::Client,
}

impl HttpLoader {
    /// Builds a loader whose every request is capped at `timeout`.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Loader for HttpLoader {
    async fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        let response = self
            .client
            .get(key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("status code: {}", status);
        }
        Ok(response.bytes().await?.to_vec())
    }
}
