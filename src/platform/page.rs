use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex};

use crate::platform::environment;

type LoadHandler = Box<dyn FnOnce() + Send + 'static>;

/// The SDK's model of the embedding page: access protocol, host, and the
/// load-event state some providers defer their bootstrap on.
///
/// Handlers registered through [`PageContext::on_load`] are kept in an ordered
/// list and run in registration order when the host application reports the
/// load event via [`PageContext::fire_load`]; a handler registered after the
/// event runs immediately, since the event will never fire again.
pub struct PageContext {
    protocol: Mutex<String>,
    host: Mutex<String>,
    loaded: AtomicBool,
    handlers: Mutex<Vec<LoadHandler>>,
    page_load_timestamp: DateTime<Utc>,
}

impl PageContext {
    pub fn new() -> Self {
        Self {
            protocol: Mutex::new(environment::default_protocol()),
            host: Mutex::new(environment::default_host()),
            loaded: AtomicBool::new(false),
            handlers: Mutex::new(Vec::new()),
            page_load_timestamp: Utc::now(),
        }
    }

    pub fn shared() -> Arc<PageContext> {
        static INSTANCE: LazyLock<Arc<PageContext>> = LazyLock::new(|| Arc::new(PageContext::new()));
        INSTANCE.clone()
    }

    /// Current access protocol, including the trailing colon (`"https:"`).
    pub fn protocol(&self) -> String {
        self.protocol.lock().unwrap().clone()
    }

    pub fn set_protocol(&self, protocol: impl Into<String>) {
        *self.protocol.lock().unwrap() = protocol.into();
    }

    pub fn host(&self) -> String {
        self.host.lock().unwrap().clone()
    }

    pub fn set_host(&self, host: impl Into<String>) {
        *self.host.lock().unwrap() = host.into();
    }

    /// Captured once at construction and never updated.
    pub fn page_load_timestamp(&self) -> DateTime<Utc> {
        self.page_load_timestamp
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    pub fn on_load(&self, handler: impl FnOnce() + Send + 'static) {
        let mut handlers = self.handlers.lock().unwrap();
        if self.is_loaded() {
            drop(handlers);
            handler();
        } else {
            handlers.push(Box::new(handler));
        }
    }

    /// Marks the page loaded and runs pending handlers in registration order.
    /// Only the first call has any effect.
    pub fn fire_load(&self) {
        let mut handlers = self.handlers.lock().unwrap();
        if self.loaded.swap(true, Ordering::SeqCst) {
            return;
        }
        let pending: Vec<LoadHandler> = handlers.drain(..).collect();
        drop(handlers);
        for handler in pending {
            handler();
        }
    }

    /// Returns the load flag and handler list to their initial state. The
    /// page-load timestamp is immutable and survives a reset.
    pub fn reset(&self) {
        self.loaded.store(false, Ordering::SeqCst);
        self.handlers.lock().unwrap().clear();
    }
}

impl Default for PageContext {
    fn default() -> Self {
        Self::new()
    }
}
