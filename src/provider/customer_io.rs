use std::sync::Mutex;

use serde_json::{json, Map, Value};

use crate::analytics::error::{invalid_configuration, AnalyticsResult};
use crate::loader::ScriptDocument;
use crate::provider::settings::resolve_settings;
use crate::provider::types::{Capabilities, Provider};
use crate::provider::vendor;
use crate::util::{is_email, to_epoch_seconds};

const QUEUE: &str = "_cio";

/// Customer.io.
///
/// `identify` folds the user id into the trait payload and derives
/// `email`/`created_at` fields before forwarding; an explicit `email` trait
/// always wins over an email-shaped id.
pub(crate) struct CustomerIo {
    settings: Mutex<Option<Map<String, Value>>>,
}

impl CustomerIo {
    pub(crate) fn new() -> Self {
        Self {
            settings: Mutex::new(None),
        }
    }
}

impl Provider for CustomerIo {
    fn name(&self) -> &'static str {
        "Customer.io"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identify: true,
            track: true,
        }
    }

    fn initialize(&self, settings: Value) -> AnalyticsResult<()> {
        let settings = resolve_settings(settings, "siteId")?;
        let site_id = settings
            .get("siteId")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid_configuration("Customer.io requires a `siteId`"))?;

        vendor::shared().install_queue(QUEUE);
        let tracker = ScriptDocument::shared().load("//assets.customer.io/assets/track.js", None)?;
        tracker.set_attribute("id", "cio-tracker");
        tracker.set_attribute("data-site-id", site_id);

        *self.settings.lock().unwrap() = Some(settings);
        Ok(())
    }

    fn identify(
        &self,
        user_id: Option<&str>,
        traits: Option<Map<String, Value>>,
    ) -> AnalyticsResult<()> {
        let Some(id) = user_id else {
            return Ok(());
        };

        let mut properties = traits.unwrap_or_default();
        properties.insert("id".to_string(), json!(id));
        if !properties.contains_key("email") && is_email(id) {
            properties.insert("email".to_string(), json!(id));
        }
        if let Some(created) = properties.remove("createdAt") {
            if let Some(seconds) = to_epoch_seconds(&created) {
                properties.insert("created_at".to_string(), json!(seconds));
            }
        }

        vendor::shared().push(QUEUE, json!(["identify", properties]))
    }

    fn track(&self, event: &str, properties: Option<Map<String, Value>>) -> AnalyticsResult<()> {
        let properties = properties.map(Value::Object).unwrap_or(Value::Null);
        vendor::shared().push(QUEUE, json!(["track", event, properties]))
    }
}
