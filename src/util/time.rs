use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Converts a `createdAt`-style value into whole epoch seconds.
///
/// Numbers are interpreted as epoch milliseconds, the JS `Date` constructor's
/// numeric form. Strings are accepted as RFC 3339 timestamps or calendar
/// dates. Anything else yields `None` and the caller drops the field.
pub fn to_epoch_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => {
            if let Some(millis) = number.as_i64() {
                Some(millis.div_euclid(1000))
            } else {
                number.as_f64().map(|millis| (millis / 1000.0).floor() as i64)
            }
        }
        Value::String(text) => parse_timestamp(text),
        _ => None,
    }
}

fn parse_timestamp(text: &str) -> Option<i64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.timestamp());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(parsed.and_utc().timestamp());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_hms_opt(0, 0, 0).expect("midnight").and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_milliseconds_floor_to_seconds() {
        assert_eq!(to_epoch_seconds(&json!(1_355_097_600_999_i64)), Some(1_355_097_600));
        assert_eq!(to_epoch_seconds(&json!(1500.25)), Some(1));
    }

    #[test]
    fn rfc3339_strings_parse() {
        assert_eq!(
            to_epoch_seconds(&json!("2012-12-10T00:00:00Z")),
            Some(1_355_097_600)
        );
        assert_eq!(
            to_epoch_seconds(&json!("2012-12-10T00:00:01+00:00")),
            Some(1_355_097_601)
        );
    }

    #[test]
    fn bare_dates_resolve_to_midnight_utc() {
        assert_eq!(to_epoch_seconds(&json!("2012-12-10")), Some(1_355_097_600));
    }

    #[test]
    fn unparseable_values_are_dropped() {
        assert_eq!(to_epoch_seconds(&json!("next tuesday")), None);
        assert_eq!(to_epoch_seconds(&json!(true)), None);
        assert_eq!(to_epoch_seconds(&json!(["2012"])), None);
    }
}
