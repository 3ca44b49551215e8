use std::sync::Mutex;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::analytics::error::{internal_error, invalid_configuration, AnalyticsResult};
use crate::loader::ScriptDocument;
use crate::platform::PageContext;
use crate::provider::settings::resolve_settings;
use crate::provider::types::{Capabilities, Provider};
use crate::provider::vendor;

const CONFIG_GLOBAL: &str = "_sf_async_config";
const ENDPOINT_GLOBAL: &str = "_sf_endpt";

/// Chartbeat. Bootstrap only.
///
/// Chartbeat measures from the page's load time, so the bootstrap publishes
/// the timestamp captured at process start rather than relying on a load
/// event that may already have fired.
pub(crate) struct Chartbeat {
    settings: Mutex<Option<Map<String, Value>>>,
}

#[derive(Serialize)]
struct SiteConfig<'a> {
    uid: &'a str,
    domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a Value>,
    #[serde(rename = "useCanonical", skip_serializing_if = "Option::is_none")]
    use_canonical: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sections: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authors: Option<&'a Value>,
    #[serde(rename = "noCookies", skip_serializing_if = "Option::is_none")]
    no_cookies: Option<&'a Value>,
}

impl Chartbeat {
    pub(crate) fn new() -> Self {
        Self {
            settings: Mutex::new(None),
        }
    }
}

impl Provider for Chartbeat {
    fn name(&self) -> &'static str {
        "Chartbeat"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn initialize(&self, settings: Value) -> AnalyticsResult<()> {
        let settings = resolve_settings(settings, "uid")?;
        let uid = settings
            .get("uid")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid_configuration("Chartbeat requires a `uid`"))?;

        let page = PageContext::shared();
        let config = SiteConfig {
            uid,
            domain: settings
                .get("domain")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| page.host()),
            path: settings.get("path"),
            title: settings.get("title"),
            use_canonical: settings.get("useCanonical"),
            sections: settings.get("sections"),
            authors: settings.get("authors"),
            no_cookies: settings.get("noCookies"),
        };
        let config = serde_json::to_value(&config)
            .map_err(|err| internal_error(format!("chartbeat config failed to serialize: {err}")))?;

        let globals = vendor::shared();
        globals.set_object(CONFIG_GLOBAL, config);
        globals.set_object(
            ENDPOINT_GLOBAL,
            json!(page.page_load_timestamp().timestamp_millis()),
        );

        let src = if page.protocol() == "https:" {
            "//a248.e.akamai.net/chartbeat.download.akamai.com/102508/js/chartbeat.js"
        } else {
            "//static.chartbeat.com/js/chartbeat.js"
        };
        ScriptDocument::shared().load(src, None)?;

        *self.settings.lock().unwrap() = Some(settings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{install_recording_fetcher, shared_state_guard};

    #[tokio::test(flavor = "current_thread")]
    async fn domain_defaults_to_the_page_host() {
        let _guard = shared_state_guard();
        install_recording_fetcher();
        PageContext::shared().set_host("news.example.com");

        Chartbeat::new().initialize(json!("UID-1")).unwrap();

        let config = vendor::shared().object(CONFIG_GLOBAL).unwrap();
        assert_eq!(config["uid"], json!("UID-1"));
        assert_eq!(config["domain"], json!("news.example.com"));
        assert!(config.get("path").is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn extra_settings_pass_through_verbatim() {
        let _guard = shared_state_guard();
        install_recording_fetcher();

        Chartbeat::new()
            .initialize(json!({
                "uid": "UID-1",
                "domain": "example.com",
                "path": "/story",
                "useCanonical": true,
                "sections": "news,world",
                "noCookies": true
            }))
            .unwrap();

        let config = vendor::shared().object(CONFIG_GLOBAL).unwrap();
        assert_eq!(config["domain"], json!("example.com"));
        assert_eq!(config["path"], json!("/story"));
        assert_eq!(config["useCanonical"], json!(true));
        assert_eq!(config["sections"], json!("news,world"));
        assert_eq!(config["noCookies"], json!(true));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn publishes_the_page_load_timestamp() {
        let _guard = shared_state_guard();
        install_recording_fetcher();

        Chartbeat::new().initialize(json!("UID-1")).unwrap();

        let expected = PageContext::shared().page_load_timestamp().timestamp_millis();
        assert_eq!(
            vendor::shared().object(ENDPOINT_GLOBAL),
            Some(json!(expected))
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn script_choice_follows_the_page_protocol() {
        let _guard = shared_state_guard();
        let fetcher = install_recording_fetcher();

        Chartbeat::new().initialize(json!("UID-1")).unwrap();
        crate::platform::runtime::sleep(std::time::Duration::from_millis(10)).await;
        assert!(fetcher.requests()[0].contains("a248.e.akamai.net"));

        PageContext::shared().set_protocol("http:");
        Chartbeat::new().initialize(json!("UID-1")).unwrap();
        crate::platform::runtime::sleep(std::time::Duration::from_millis(10)).await;
        assert!(fetcher.requests()[1].contains("static.chartbeat.com"));
    }
}
