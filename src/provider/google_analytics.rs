use std::sync::Mutex;

use serde_json::{json, Map, Value};

use crate::analytics::error::{invalid_configuration, AnalyticsResult};
use crate::loader::ScriptDocument;
use crate::platform::PageContext;
use crate::provider::settings::resolve_settings;
use crate::provider::types::{Capabilities, Provider};
use crate::provider::vendor;

const QUEUE: &str = "_gaq";

/// Google Analytics (classic `ga.js`).
///
/// Tracks in aggregate only: every event lands under the fixed `All` category
/// and event properties are not forwarded.
pub(crate) struct GoogleAnalytics {
    settings: Mutex<Option<Map<String, Value>>>,
}

impl GoogleAnalytics {
    pub(crate) fn new() -> Self {
        Self {
            settings: Mutex::new(None),
        }
    }
}

impl Provider for GoogleAnalytics {
    fn name(&self) -> &'static str {
        "Google Analytics"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identify: false,
            track: true,
        }
    }

    fn initialize(&self, settings: Value) -> AnalyticsResult<()> {
        let settings = resolve_settings(settings, "trackingId")?;
        let tracking_id = settings
            .get("trackingId")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid_configuration("Google Analytics requires a `trackingId`"))?;

        let globals = vendor::shared();
        globals.install_queue(QUEUE);
        globals.push(QUEUE, json!(["_setAccount", tracking_id]))?;

        if settings.get("enhancedLinkAttribution") == Some(&Value::Bool(true)) {
            let plugin = if PageContext::shared().protocol() == "https:" {
                "https://ssl.google-analytics.com/plugins/ga/inpage_linkid.js"
            } else {
                "http://www.google-analytics.com/plugins/ga/inpage_linkid.js"
            };
            globals.push(QUEUE, json!(["_require", "inpage_linkid", plugin]))?;
        }

        if let Some(rate) = settings.get("siteSpeedSampleRate").filter(|v| v.is_number()) {
            globals.push(QUEUE, json!(["_setSiteSpeedSampleRate", rate]))?;
        }

        globals.push(QUEUE, json!(["_trackPageview"]))?;
        ScriptDocument::shared().load("//google-analytics.com/ga.js", None)?;

        *self.settings.lock().unwrap() = Some(settings);
        Ok(())
    }

    fn track(&self, event: &str, _properties: Option<Map<String, Value>>) -> AnalyticsResult<()> {
        vendor::shared().push(QUEUE, json!(["_trackEvent", "All", event]))
    }
}
