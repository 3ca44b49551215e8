use std::sync::Mutex;

use chrono::Utc;
use serde_json::{Map, Value};

use crate::analytics::error::{invalid_configuration, AnalyticsResult};
use crate::loader::ScriptDocument;
use crate::provider::settings::resolve_settings;
use crate::provider::types::{Capabilities, Provider};

/// CrazyEgg heatmaps. Bootstrap only; there is nothing to identify or track.
pub(crate) struct CrazyEgg {
    settings: Mutex<Option<Map<String, Value>>>,
}

impl CrazyEgg {
    pub(crate) fn new() -> Self {
        Self {
            settings: Mutex::new(None),
        }
    }
}

impl Provider for CrazyEgg {
    fn name(&self) -> &'static str {
        "CrazyEgg"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn initialize(&self, settings: Value) -> AnalyticsResult<()> {
        let settings = resolve_settings(settings, "apiKey")?;
        let api_key = settings
            .get("apiKey")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid_configuration("CrazyEgg requires an `apiKey`"))?;

        // Hour-bucket cache buster, as the original snippet computes it.
        let bucket = Utc::now().timestamp_millis() / 3_600_000;
        ScriptDocument::shared().load(
            &format!("//dnn506yrbagrg.cloudfront.net/pages/scripts/{api_key}.js?{bucket}"),
            None,
        )?;

        *self.settings.lock().unwrap() = Some(settings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{install_recording_fetcher, shared_state_guard};
    use serde_json::json;

    #[tokio::test(flavor = "current_thread")]
    async fn initialize_requests_the_keyed_script() {
        let _guard = shared_state_guard();
        let fetcher = install_recording_fetcher();

        CrazyEgg::new().initialize(json!("0013/7876")).unwrap();

        crate::platform::runtime::sleep(std::time::Duration::from_millis(10)).await;
        let requests = fetcher.requests();
        assert_eq!(requests.len(), 1);
        let src = &requests[0];
        assert!(src.starts_with("https://dnn506yrbagrg.cloudfront.net/pages/scripts/0013/7876.js?"));
        let bucket = src.split('?').nth(1).unwrap();
        assert!(bucket.parse::<i64>().is_ok());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn implements_no_optional_capabilities() {
        let provider = CrazyEgg::new();
        assert_eq!(provider.capabilities(), Capabilities::default());
        // Default trait methods accept dispatch without doing anything.
        provider.identify(Some("u1"), None).unwrap();
        provider.track("ignored", None).unwrap();
    }
}
