use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex};

use serde_json::{Map, Value};

use crate::analytics::error::{provider_not_found, AnalyticsResult};
use crate::logger::LOGGER;
use crate::provider::{registry, Provider};
use crate::util::shallow_clone;

/// The dispatch facade: one call site for identification and event tracking,
/// fanned out to every provider enabled by [`Analytics::initialize`].
///
/// Cheaply cloneable; clones share state. Most hosts use the process-wide
/// instance from [`Analytics::shared`], while tests construct their own.
#[derive(Clone, Default)]
pub struct Analytics {
    inner: Arc<AnalyticsInner>,
}

#[derive(Default)]
struct AnalyticsInner {
    providers: Mutex<Vec<Arc<dyn Provider>>>,
    user_id: Mutex<Option<String>>,
    initialized: AtomicBool,
}

impl fmt::Debug for Analytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analytics")
            .field("providers", &self.provider_names())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl Analytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Analytics {
        static INSTANCE: LazyLock<Analytics> = LazyLock::new(Analytics::new);
        INSTANCE.clone()
    }

    /// Enables the named providers, passing each its settings value. Call it
    /// before identifying or tracking anything:
    ///
    /// ```text
    /// analytics.initialize([
    ///     ("Google Analytics", json!("UA-XXXXXXX-X")),
    ///     ("KISSmetrics",      json!("XXXXXXXXXXX")),
    /// ])
    /// ```
    ///
    /// The active set is replaced, not merged: every call starts from an
    /// empty provider list. Providers are activated one at a time in the
    /// order given, so a name that fails lookup aborts the call with the
    /// names before it already activated and the facade still marked
    /// uninitialized.
    pub fn initialize<I, S>(&self, providers: I) -> AnalyticsResult<()>
    where
        I: IntoIterator<Item = (S, Value)>,
        S: AsRef<str>,
    {
        let mut active = self.inner.providers.lock().unwrap();
        active.clear();

        for (name, settings) in providers {
            let name = name.as_ref();
            let provider = registry::lookup(name).ok_or_else(|| provider_not_found(name))?;
            provider.initialize(settings)?;
            active.push(provider);
        }
        drop(active);

        self.inner.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Ties subsequent actions to a user and records traits about them.
    ///
    /// A non-null `user_id` is persisted and reused by later calls that omit
    /// it (last write wins). Each identify-capable provider receives its own
    /// shallow copy of the traits, so one provider's mutations are never
    /// visible to the next. A no-op until `initialize` has succeeded.
    pub fn identify(&self, user_id: Option<&str>, traits: Option<&Map<String, Value>>) {
        if !self.is_initialized() {
            return;
        }

        let user_id = {
            let mut stored = self.inner.user_id.lock().unwrap();
            match user_id {
                Some(id) => {
                    *stored = Some(id.to_string());
                    Some(id.to_string())
                }
                None => stored.clone(),
            }
        };

        for provider in self.active_providers() {
            if !provider.capabilities().identify {
                continue;
            }
            let copy = traits.map(shallow_clone);
            if let Err(err) = provider.identify(user_id.as_deref(), copy) {
                LOGGER.warn(format!(
                    "identify dispatch to {} failed: {err}",
                    provider.name()
                ));
            }
        }
    }

    /// Traits-only identification, the counterpart of calling the JS API with
    /// a settings-shaped object as the first argument: the user id is treated
    /// as absent and any previously persisted id is used.
    pub fn identify_traits(&self, traits: &Map<String, Value>) {
        self.identify(None, Some(traits));
    }

    /// Records an event, with optional properties, on every track-capable
    /// provider. Each provider receives its own shallow copy of the
    /// properties. A no-op until `initialize` has succeeded.
    pub fn track(&self, event: &str, properties: Option<&Map<String, Value>>) {
        if !self.is_initialized() {
            return;
        }

        for provider in self.active_providers() {
            if !provider.capabilities().track {
                continue;
            }
            let copy = properties.map(shallow_clone);
            if let Err(err) = provider.track(event, copy) {
                LOGGER.warn(format!(
                    "track dispatch to {} failed: {err}",
                    provider.name()
                ));
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.load(Ordering::SeqCst)
    }

    /// The persisted user id, if any identify call has supplied one.
    pub fn user_id(&self) -> Option<String> {
        self.inner.user_id.lock().unwrap().clone()
    }

    /// Names of the currently active providers, in activation order.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.active_providers()
            .iter()
            .map(|provider| provider.name())
            .collect()
    }

    fn active_providers(&self) -> Vec<Arc<dyn Provider>> {
        self.inner.providers.lock().unwrap().clone()
    }
}
