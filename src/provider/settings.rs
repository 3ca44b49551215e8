use serde_json::{Map, Value};

use crate::analytics::error::{invalid_configuration, AnalyticsResult};

/// Normalizes a caller-supplied settings value into its canonical object form.
///
/// A bare string is shorthand for the provider's single required credential
/// and becomes `{ field_name: value }`. An object passes through unchanged.
/// Anything else is a configuration error.
pub fn resolve_settings(settings: Value, field_name: &str) -> AnalyticsResult<Map<String, Value>> {
    match settings {
        Value::String(credential) => {
            let mut resolved = Map::new();
            resolved.insert(field_name.to_string(), Value::String(credential));
            Ok(resolved)
        }
        Value::Object(resolved) => Ok(resolved),
        _ => Err(invalid_configuration(
            "encountered unresolvable settings value",
        )),
    }
}
