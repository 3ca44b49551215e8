//! Helpers for tests that touch the process-wide page model. Tests grab the
//! guard first so shared state never leaks between them.

use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::loader::{LoadError, ResourceFetcher, ScriptDocument};
use crate::platform::PageContext;
use crate::provider::vendor;

static SHARED_STATE: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Serializes tests against the shared singletons and returns them to their
/// seeded state before the test body runs.
pub(crate) fn shared_state_guard() -> MutexGuard<'static, ()> {
    let guard = SHARED_STATE
        .lock()
        .unwrap_or_else(|poison| poison.into_inner());
    vendor::shared().reset();
    ScriptDocument::shared().reset();
    PageContext::shared().reset();
    PageContext::shared().set_protocol("https:");
    PageContext::shared().set_host("localhost");
    guard
}

#[derive(Default)]
pub(crate) struct RecordingFetcher {
    requests: Mutex<Vec<String>>,
}

impl RecordingFetcher {
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl ResourceFetcher for RecordingFetcher {
    async fn fetch(&self, url: &str) -> Result<(), LoadError> {
        self.requests.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

/// Points the shared script document at a fresh recording fetcher so no test
/// touches the network.
pub(crate) fn install_recording_fetcher() -> Arc<RecordingFetcher> {
    let fetcher = Arc::new(RecordingFetcher::default());
    ScriptDocument::shared().set_fetcher(fetcher.clone());
    fetcher
}
