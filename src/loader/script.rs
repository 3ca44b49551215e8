use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex};

use url::Url;

use crate::loader::fetch::{HttpFetcher, LoadError, ResourceFetcher};
use crate::platform::runtime;
use crate::platform::PageContext;

pub type LoadCallback = Arc<dyn Fn() + Send + Sync + 'static>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptKind {
    /// The host page's own script, present before the SDK runs. It anchors
    /// insert-before-first ordering and never completes a load of its own.
    HostPage,
    Injected,
}

/// One entry in the page's script list. Providers receive this handle back
/// from [`ScriptDocument::load`] to stamp identifying attributes on it.
pub struct ScriptRequest {
    src: String,
    kind: ScriptKind,
    attributes: Mutex<BTreeMap<String, String>>,
    loaded: AtomicBool,
    failed: AtomicBool,
    on_load: Mutex<Option<LoadCallback>>,
}

impl std::fmt::Debug for ScriptRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptRequest")
            .field("src", &self.src)
            .field("kind", &self.kind)
            .field("attributes", &self.attributes)
            .field("loaded", &self.loaded)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl ScriptRequest {
    fn host_page() -> Self {
        Self::new(String::new(), ScriptKind::HostPage)
    }

    fn injected(src: String) -> Self {
        Self::new(src, ScriptKind::Injected)
    }

    fn new(src: String, kind: ScriptKind) -> Self {
        Self {
            src,
            kind,
            attributes: Mutex::new(BTreeMap::new()),
            loaded: AtomicBool::new(false),
            failed: AtomicBool::new(false),
            on_load: Mutex::new(None),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes
            .lock()
            .unwrap()
            .insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.lock().unwrap().get(name).cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn set_on_load(&self, callback: LoadCallback) {
        *self.on_load.lock().unwrap() = Some(callback);
    }

    fn complete(&self) {
        self.loaded.store(true, Ordering::SeqCst);
        let callback = self.on_load.lock().unwrap().take();
        if let Some(callback) = callback {
            callback();
        }
    }

    fn fail(&self) {
        self.failed.store(true, Ordering::SeqCst);
    }
}

/// The model of the page's ordered script list plus the transport used to
/// request script bodies. Loads are fire-and-forget: nothing awaits them and
/// nothing retries them.
pub struct ScriptDocument {
    page: Arc<PageContext>,
    scripts: Mutex<Vec<Arc<ScriptRequest>>>,
    fetcher: Mutex<Arc<dyn ResourceFetcher>>,
}

impl ScriptDocument {
    pub fn new() -> Self {
        Self::with_page(PageContext::shared())
    }

    pub fn with_page(page: Arc<PageContext>) -> Self {
        Self {
            page,
            scripts: Mutex::new(vec![Arc::new(ScriptRequest::host_page())]),
            fetcher: Mutex::new(Arc::new(HttpFetcher::new())),
        }
    }

    pub fn shared() -> Arc<ScriptDocument> {
        static INSTANCE: LazyLock<Arc<ScriptDocument>> =
            LazyLock::new(|| Arc::new(ScriptDocument::new()));
        INSTANCE.clone()
    }

    /// Overrides the transport scripts are requested with. Intended for
    /// embedders that proxy loads and for tests.
    pub fn set_fetcher(&self, fetcher: Arc<dyn ResourceFetcher>) {
        *self.fetcher.lock().unwrap() = fetcher;
    }

    /// Requests a remote script, inserting it immediately before the first
    /// script already in the document so relative execution order matches the
    /// original snippets' expectations.
    ///
    /// A supplied callback is chained onto the script that was first *before*
    /// this insertion, replacing any handler it carried. Chaining to the
    /// preceding script rather than the inserted one preserves the historical
    /// behavior; against the host page's own entry the callback never fires.
    pub fn load(
        &self,
        path: &str,
        on_load: Option<LoadCallback>,
    ) -> Result<Arc<ScriptRequest>, LoadError> {
        let src = self.resolve_src(path)?;
        let request = Arc::new(ScriptRequest::injected(src));

        {
            let mut scripts = self.scripts.lock().unwrap();
            let before = scripts
                .first()
                .cloned()
                .expect("script document always holds the host page entry");
            if let Some(callback) = on_load {
                before.set_on_load(callback);
            }
            scripts.insert(0, request.clone());
        }

        let fetcher = self.fetcher.lock().unwrap().clone();
        let pending = request.clone();
        runtime::spawn_detached(async move {
            match fetcher.fetch(pending.src()).await {
                Ok(()) => pending.complete(),
                Err(err) => {
                    pending.fail();
                    log::debug!("script load failed for {}: {err}", pending.src());
                }
            }
        });

        Ok(request)
    }

    /// Snapshot of the script list, first entry first.
    pub fn scripts(&self) -> Vec<Arc<ScriptRequest>> {
        self.scripts.lock().unwrap().clone()
    }

    /// Drops every injected script, returning the document to its seeded
    /// state. For tests.
    pub fn reset(&self) {
        *self.scripts.lock().unwrap() = vec![Arc::new(ScriptRequest::host_page())];
    }

    fn resolve_src(&self, path: &str) -> Result<String, LoadError> {
        let absolute = if let Some(rest) = path.strip_prefix("//") {
            format!("{}//{}", self.page.protocol(), rest)
        } else {
            path.to_string()
        };
        Url::parse(&absolute)
            .map_err(|err| LoadError::new(format!("unresolvable script src `{path}`: {err}")))?;
        Ok(absolute)
    }
}

impl Default for ScriptDocument {
    fn default() -> Self {
        Self::new()
    }
}
