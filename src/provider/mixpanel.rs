use std::sync::Mutex;

use serde_json::{json, Map, Value};

use crate::analytics::error::{invalid_configuration, AnalyticsResult};
use crate::loader::ScriptDocument;
use crate::provider::settings::resolve_settings;
use crate::provider::types::{Capabilities, Provider};
use crate::provider::vendor;
use crate::util::is_email;

const QUEUE: &str = "mixpanel";

/// Mixpanel.
///
/// Trait keys are forwarded through `register` with Mixpanel's `$` prefix.
/// The People feature is opt-in via `people: true` because Mixpanel bills for
/// it; enabling it issues `people.identify`/`people.set` on top of the
/// default calls.
pub(crate) struct Mixpanel {
    settings: Mutex<Option<Map<String, Value>>>,
}

impl Mixpanel {
    pub(crate) fn new() -> Self {
        Self {
            settings: Mutex::new(None),
        }
    }

    fn people_enabled(&self) -> bool {
        self.settings
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|settings| settings.get("people"))
            == Some(&Value::Bool(true))
    }
}

fn alias_traits(traits: &Map<String, Value>) -> Map<String, Value> {
    let mut transformed = Map::new();
    for (key, value) in traits.iter() {
        transformed.insert(format!("${key}"), value.clone());
    }
    transformed
}

impl Provider for Mixpanel {
    fn name(&self) -> &'static str {
        "Mixpanel"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identify: true,
            track: true,
        }
    }

    fn initialize(&self, settings: Value) -> AnalyticsResult<()> {
        let settings = resolve_settings(settings, "token")?;
        let token = settings
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid_configuration("Mixpanel requires a `token`"))?
            .to_string();

        vendor::shared().install_queue(QUEUE);
        ScriptDocument::shared().load("//cdn.mxpnl.com/libs/mixpanel-2.1.min.js", None)?;
        // The full settings object rides along with the token, as the real
        // library's `init` expects.
        vendor::shared().push(QUEUE, json!(["init", token, settings.clone()]))?;

        *self.settings.lock().unwrap() = Some(settings);
        Ok(())
    }

    fn identify(
        &self,
        user_id: Option<&str>,
        mut traits: Option<Map<String, Value>>,
    ) -> AnalyticsResult<()> {
        let globals = vendor::shared();

        if let Some(id) = user_id {
            globals.push(QUEUE, json!(["identify", id]))?;
            globals.push(QUEUE, json!(["name_tag", id]))?;

            // An email-shaped id doubles as the email trait. Mixpanel's rule
            // overwrites an explicit `email` trait, unlike Customer.io's.
            if is_email(id) {
                traits
                    .get_or_insert_with(Map::new)
                    .insert("email".to_string(), json!(id));
            }
        }

        if let Some(ref traits) = traits {
            globals.push(QUEUE, json!(["register", alias_traits(traits)]))?;
        }

        if self.people_enabled() {
            if let Some(id) = user_id {
                globals.push(QUEUE, json!(["people.identify", id]))?;
            }
            if let Some(ref traits) = traits {
                globals.push(QUEUE, json!(["people.set", traits]))?;
            }
        }

        Ok(())
    }

    fn track(&self, event: &str, properties: Option<Map<String, Value>>) -> AnalyticsResult<()> {
        let properties = properties.map(Value::Object).unwrap_or(Value::Null);
        vendor::shared().push(QUEUE, json!(["track", event, properties]))
    }
}
