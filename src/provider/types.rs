use serde_json::{Map, Value};

use crate::analytics::error::AnalyticsResult;

/// Which optional capabilities a provider implements. The dispatcher checks
/// this before invoking, so `identify`/`track` are never called on an adapter
/// whose flag is unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub identify: bool,
    pub track: bool,
}

/// A provider adapter: translates the unified initialize/identify/track calls
/// into one destination's native bootstrap and queue commands.
///
/// Adapters are constructed once as stateless templates for the registry.
/// `initialize` resolves and stores their settings; calling it again replaces
/// the stored settings. Adapters are never torn down.
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    fn initialize(&self, settings: Value) -> AnalyticsResult<()>;

    fn identify(
        &self,
        _user_id: Option<&str>,
        _traits: Option<Map<String, Value>>,
    ) -> AnalyticsResult<()> {
        Ok(())
    }

    fn track(&self, _event: &str, _properties: Option<Map<String, Value>>) -> AnalyticsResult<()> {
        Ok(())
    }
}
