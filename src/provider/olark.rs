use std::sync::Mutex;

use serde_json::{json, Map, Value};

use crate::analytics::error::{invalid_configuration, AnalyticsResult};
use crate::loader::ScriptDocument;
use crate::provider::settings::resolve_settings;
use crate::provider::types::{Capabilities, Provider};
use crate::provider::vendor;

const QUEUE: &str = "olark";

/// Olark live chat.
///
/// Operator notifications for tracked events page a human, so `track` is
/// gated behind an explicit `track: true` setting.
pub(crate) struct Olark {
    settings: Mutex<Option<Map<String, Value>>>,
}

impl Olark {
    pub(crate) fn new() -> Self {
        Self {
            settings: Mutex::new(None),
        }
    }

    fn track_enabled(&self) -> bool {
        self.settings
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|settings| settings.get("track"))
            == Some(&Value::Bool(true))
    }
}

impl Provider for Olark {
    fn name(&self) -> &'static str {
        "Olark"
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
            .ok_or_else(|| invalid_configuration("Olark requires a `siteId`"))?;

        vendor::shared().install_queue(QUEUE);
        ScriptDocument::shared().load("//static.olark.com/jsclient/loader0.js", None)?;
        vendor::shared().push(QUEUE, json!(["identify", site_id]))?;

        *self.settings.lock().unwrap() = Some(settings);
        Ok(())
    }

    fn identify(
        &self,
        user_id: Option<&str>,
        _traits: Option<Map<String, Value>>,
    ) -> AnalyticsResult<()> {
        let Some(id) = user_id else {
            return Ok(());
        };
        vendor::shared().push(
            QUEUE,
            json!(["api.chat.updateVisitorNickname", {"snippet": id}]),
        )
    }

    fn track(&self, event: &str, _properties: Option<Map<String, Value>>) -> AnalyticsResult<()> {
        if !self.track_enabled() {
            return Ok(());
        }
        vendor::shared().push(
            QUEUE,
            json!([
                "api.chat.sendNotificationToOperator",
                {"body": format!("Visitor triggered \"{event}\".")}
            ]),
        )
    }
}
