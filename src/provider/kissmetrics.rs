use std::sync::Mutex;

use serde_json::{json, Map, Value};

use crate::analytics::error::{invalid_configuration, AnalyticsResult};
use crate::loader::ScriptDocument;
use crate::provider::settings::resolve_settings;
use crate::provider::types::{Capabilities, Provider};
use crate::provider::vendor;

const QUEUE: &str = "_kmq";

/// KISSmetrics.
///
/// Identification is two separate commands: `identify` stores the user id and
/// `set` stores the traits. Either half runs on its own when the other
/// argument is absent.
pub(crate) struct Kissmetrics {
    settings: Mutex<Option<Map<String, Value>>>,
}

impl Kissmetrics {
    pub(crate) fn new() -> Self {
        Self {
            settings: Mutex::new(None),
        }
    }
}

impl Provider for Kissmetrics {
    fn name(&self) -> &'static str {
        "KISSmetrics"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identify: true,
            track: true,
        }
    }

    fn initialize(&self, settings: Value) -> AnalyticsResult<()> {
        let settings = resolve_settings(settings, "apiKey")?;
        let api_key = settings
            .get("apiKey")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid_configuration("KISSmetrics requires an `apiKey`"))?;

        vendor::shared().install_queue(QUEUE);
        let document = ScriptDocument::shared();
        document.load("//i.kissmetrics.com/i.js", None)?;
        document.load(&format!("//doug1izaerwt3.cloudfront.net/{api_key}.1.js"), None)?;

        *self.settings.lock().unwrap() = Some(settings);
        Ok(())
    }

    fn identify(
        &self,
        user_id: Option<&str>,
        traits: Option<Map<String, Value>>,
    ) -> AnalyticsResult<()> {
        let globals = vendor::shared();
        if let Some(id) = user_id {
            globals.push(QUEUE, json!(["identify", id]))?;
        }
        if let Some(traits) = traits {
            globals.push(QUEUE, json!(["set", traits]))?;
        }
        Ok(())
    }

    fn track(&self, event: &str, properties: Option<Map<String, Value>>) -> AnalyticsResult<()> {
        let properties = properties.map(Value::Object).unwrap_or(Value::Null);
        vendor::shared().push(QUEUE, json!(["record", event, properties]))
    }
}
