use std::fmt::{Display, Formatter};

use async_trait::async_trait;

/// Failure while resolving or requesting a remote script. Never retried; a
/// failed load leaves the affected provider non-functional.
#[derive(Clone, Debug)]
pub struct LoadError {
    message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LoadError {}

/// Transport used to request provider bootstrap scripts. Swappable so
/// embedders can route loads through their own stack and tests can record
/// them without touching the network.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<(), LoadError>;
}

/// Default transport: a plain GET for the script body. Executing the fetched
/// code is the host environment's business, not the dispatch core's.
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<(), LoadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| LoadError::new(format!("request for {url} failed: {err}")))?;

        response
            .error_for_status()
            .map_err(|err| LoadError::new(format!("request for {url} failed: {err}")))?;

        Ok(())
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test(flavor = "current_thread")]
    async fn fetches_scripts_over_http() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/ga.js");
                then.status(200).body("// bootstrap");
            })
            .await;

        let fetcher = HttpFetcher::new();
        fetcher.fetch(&server.url("/ga.js")).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn surfaces_http_error_statuses() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.js");
                then.status(404);
            })
            .await;

        let fetcher = HttpFetcher::new();
        let err = fetcher.fetch(&server.url("/missing.js")).await.unwrap_err();
        assert!(err.to_string().contains("missing.js"));
    }
}
