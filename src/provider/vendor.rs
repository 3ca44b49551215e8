//! Model of the page globals provider bootstraps consume.
//!
//! The port does not script a real page; instead every command queue and
//! config object a provider would hang off the page lives in this registry so
//! the dispatch pipeline stays observable and testable. Externally loaded
//! provider code is expected to drain these by name.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock, Mutex};

use serde_json::Value;

use crate::analytics::error::{missing_global, AnalyticsResult};

#[derive(Debug, Default)]
pub struct VendorGlobals {
    queues: Mutex<BTreeMap<String, Vec<Value>>>,
    objects: Mutex<BTreeMap<String, Value>>,
}

impl VendorGlobals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the named command queue if its bootstrap has not already,
    /// keeping any commands queued so far (`window._q = window._q || []`).
    pub fn install_queue(&self, name: &str) {
        self.queues
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default();
    }

    pub fn has_queue(&self, name: &str) -> bool {
        self.queues.lock().unwrap().contains_key(name)
    }

    /// Appends a command to an installed queue. Pushing to a queue that was
    /// never installed fails loudly, matching a page whose provider bootstrap
    /// has not run.
    pub fn push(&self, name: &str, command: Value) -> AnalyticsResult<()> {
        let mut queues = self.queues.lock().unwrap();
        match queues.get_mut(name) {
            Some(queue) => {
                queue.push(command);
                Ok(())
            }
            None => Err(missing_global(name)),
        }
    }

    pub fn queue(&self, name: &str) -> Option<Vec<Value>> {
        self.queues.lock().unwrap().get(name).cloned()
    }

    /// Removes an installed queue, modeling the page global being clobbered
    /// out from under the SDK. For tests.
    pub fn remove_queue(&self, name: &str) {
        self.queues.lock().unwrap().remove(name);
    }

    /// Replaces the named config object (`window.intercomSettings = {...}`).
    pub fn set_object(&self, name: &str, value: Value) {
        self.objects
            .lock()
            .unwrap()
            .insert(name.to_string(), value);
    }

    pub fn object(&self, name: &str) -> Option<Value> {
        self.objects.lock().unwrap().get(name).cloned()
    }

    /// Drops every queue and object. For tests.
    pub fn reset(&self) {
        self.queues.lock().unwrap().clear();
        self.objects.lock().unwrap().clear();
    }
}

/// The process-wide registry all adapters write through.
pub fn shared() -> Arc<VendorGlobals> {
    static INSTANCE: LazyLock<Arc<VendorGlobals>> =
        LazyLock::new(|| Arc::new(VendorGlobals::new()));
    INSTANCE.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::error::AnalyticsErrorCode;
    use serde_json::json;

    #[test]
    fn install_is_idempotent_and_preserves_commands() {
        let globals = VendorGlobals::new();
        globals.install_queue("_gaq");
        globals.push("_gaq", json!(["_setAccount", "UA-1"])).unwrap();
        globals.install_queue("_gaq");

        assert_eq!(
            globals.queue("_gaq").unwrap(),
            vec![json!(["_setAccount", "UA-1"])]
        );
    }

    #[test]
    fn push_without_bootstrap_fails_loudly() {
        let globals = VendorGlobals::new();
        let err = globals.push("_kmq", json!(["record", "event"])).unwrap_err();
        assert_eq!(err.code, AnalyticsErrorCode::MissingGlobal);
        assert!(globals.queue("_kmq").is_none());
    }

    #[test]
    fn objects_replace_wholesale() {
        let globals = VendorGlobals::new();
        globals.set_object("intercomSettings", json!({"app_id": "a"}));
        globals.set_object("intercomSettings", json!({"app_id": "b"}));
        assert_eq!(
            globals.object("intercomSettings"),
            Some(json!({"app_id": "b"}))
        );
    }

    #[test]
    fn reset_clears_everything() {
        let globals = VendorGlobals::new();
        globals.install_queue("olark");
        globals.set_object("_sf_endpt", json!(1));
        globals.reset();
        assert!(!globals.has_queue("olark"));
        assert!(globals.object("_sf_endpt").is_none());
    }
}
