use std::env;

/// Protocol override for hosts that cannot report a real page location,
/// e.g. `ANALYTICS_FORCE_PROTOCOL=http:` in an emulator harness.
pub fn forced_protocol() -> Option<String> {
    env::var("ANALYTICS_FORCE_PROTOCOL").ok()
}

pub fn forced_host() -> Option<String> {
    env::var("ANALYTICS_PAGE_HOST").ok()
}

pub fn default_protocol() -> String {
    forced_protocol().unwrap_or_else(|| "https:".to_string())
}

pub fn default_host() -> String {
    forced_host().unwrap_or_else(|| "localhost".to_string())
}
