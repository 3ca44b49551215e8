use std::sync::Mutex;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::analytics::error::{internal_error, invalid_configuration, AnalyticsResult};
use crate::loader::ScriptDocument;
use crate::platform::PageContext;
use crate::provider::settings::resolve_settings;
use crate::provider::types::{Capabilities, Provider};
use crate::provider::vendor;
use crate::util::{is_email, to_epoch_seconds};

const SETTINGS_GLOBAL: &str = "intercomSettings";
const LIBRARY_SRC: &str = "//api.intercom.io/api/js/library.js";

/// Intercom.
///
/// Intercom's script identifies the user as it loads, so `initialize` only
/// stores settings; the bootstrap is deferred to the first `identify` with a
/// user id, which publishes the `intercomSettings` page global and requests
/// the library once the page has finished loading.
pub(crate) struct Intercom {
    settings: Mutex<Option<Map<String, Value>>>,
}

#[derive(Serialize)]
struct IntercomSettings<'a> {
    app_id: &'a str,
    user_id: &'a str,
    custom_data: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<i64>,
}

impl Intercom {
    pub(crate) fn new() -> Self {
        Self {
            settings: Mutex::new(None),
        }
    }
}

impl Provider for Intercom {
    fn name(&self) -> &'static str {
        "Intercom"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identify: true,
            track: false,
        }
    }

    fn initialize(&self, settings: Value) -> AnalyticsResult<()> {
        let settings = resolve_settings(settings, "appId")?;
        if settings.get("appId").and_then(Value::as_str).is_none() {
            return Err(invalid_configuration("Intercom requires an `appId`"));
        }
        *self.settings.lock().unwrap() = Some(settings);
        Ok(())
    }

    fn identify(
        &self,
        user_id: Option<&str>,
        traits: Option<Map<String, Value>>,
    ) -> AnalyticsResult<()> {
        // Traits alone are not enough for Intercom's bootstrap.
        let Some(id) = user_id else {
            return Ok(());
        };

        let settings = self
            .settings
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| internal_error("Intercom has not been initialized"))?;
        let app_id = settings
            .get("appId")
            .and_then(Value::as_str)
            .ok_or_else(|| internal_error("Intercom settings lost their `appId`"))?
            .to_string();

        let email = match &traits {
            Some(traits) => traits.get("email").cloned(),
            None => is_email(id).then(|| Value::String(id.to_string())),
        };
        let name = traits.as_ref().and_then(|traits| traits.get("name").cloned());
        let created_at = traits
            .as_ref()
            .and_then(|traits| traits.get("createdAt"))
            .and_then(to_epoch_seconds);

        let published = IntercomSettings {
            app_id: &app_id,
            user_id: id,
            custom_data: traits.unwrap_or_default(),
            email,
            name,
            created_at,
        };
        let published = serde_json::to_value(&published)
            .map_err(|err| internal_error(format!("intercomSettings failed to serialize: {err}")))?;
        vendor::shared().set_object(SETTINGS_GLOBAL, published);

        PageContext::shared().on_load(|| {
            if let Err(err) = ScriptDocument::shared().load(LIBRARY_SRC, None) {
                log::debug!("intercom library load failed: {err}");
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{install_recording_fetcher, shared_state_guard};
    use serde_json::json;

    fn traits_of(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn initialize_alone_requests_nothing() {
        let _guard = shared_state_guard();
        let fetcher = install_recording_fetcher();

        Intercom::new().initialize(json!("APP-1")).unwrap();

        crate::platform::runtime::sleep(std::time::Duration::from_millis(10)).await;
        assert!(fetcher.requests().is_empty());
        assert!(vendor::shared().object(SETTINGS_GLOBAL).is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn identify_without_user_id_is_a_noop() {
        let _guard = shared_state_guard();
        install_recording_fetcher();

        let provider = Intercom::new();
        provider.initialize(json!("APP-1")).unwrap();
        provider
            .identify(None, Some(traits_of(json!({"name": "Achilles"}))))
            .unwrap();

        assert!(vendor::shared().object(SETTINGS_GLOBAL).is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn identify_publishes_the_settings_global() {
        let _guard = shared_state_guard();
        install_recording_fetcher();

        let provider = Intercom::new();
        provider.initialize(json!("APP-1")).unwrap();
        provider
            .identify(
                Some("u1"),
                Some(traits_of(json!({
                    "name": "Achilles",
                    "age": 23,
                    "createdAt": "2012-12-10T00:00:00Z"
                }))),
            )
            .unwrap();

        let published = vendor::shared().object(SETTINGS_GLOBAL).unwrap();
        assert_eq!(published["app_id"], json!("APP-1"));
        assert_eq!(published["user_id"], json!("u1"));
        assert_eq!(published["name"], json!("Achilles"));
        assert_eq!(published["created_at"], json!(1_355_097_600));
        assert_eq!(published["custom_data"]["age"], json!(23));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn email_comes_from_the_id_only_without_traits() {
        let _guard = shared_state_guard();
        install_recording_fetcher();

        let provider = Intercom::new();
        provider.initialize(json!("APP-1")).unwrap();

        provider.identify(Some("user@example.com"), None).unwrap();
        let published = vendor::shared().object(SETTINGS_GLOBAL).unwrap();
        assert_eq!(published["email"], json!("user@example.com"));

        // With traits present, only an explicit email trait is used.
        provider
            .identify(
                Some("user@example.com"),
                Some(traits_of(json!({"name": "Achilles"}))),
            )
            .unwrap();
        let published = vendor::shared().object(SETTINGS_GLOBAL).unwrap();
        assert!(published.get("email").is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn library_load_waits_for_the_page_load_event() {
        let _guard = shared_state_guard();
        let fetcher = install_recording_fetcher();

        let provider = Intercom::new();
        provider.initialize(json!("APP-1")).unwrap();
        provider.identify(Some("u1"), None).unwrap();

        crate::platform::runtime::sleep(std::time::Duration::from_millis(10)).await;
        assert!(fetcher.requests().is_empty());

        PageContext::shared().fire_load();
        crate::platform::runtime::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(
            fetcher.requests(),
            vec!["https://api.intercom.io/api/js/library.js".to_string()]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn already_loaded_page_loads_immediately() {
        let _guard = shared_state_guard();
        let fetcher = install_recording_fetcher();
        PageContext::shared().fire_load();

        let provider = Intercom::new();
        provider.initialize(json!("APP-1")).unwrap();
        provider.identify(Some("u1"), None).unwrap();

        crate::platform::runtime::sleep(std::time::Duration::from_millis(10)).await;
        assert_eq!(
            fetcher.requests(),
            vec!["https://api.intercom.io/api/js/library.js".to_string()]
        );
    }
}
