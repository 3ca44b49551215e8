use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::provider::chartbeat::Chartbeat;
use crate::provider::crazy_egg::CrazyEgg;
use crate::provider::customer_io::CustomerIo;
use crate::provider::google_analytics::GoogleAnalytics;
use crate::provider::intercom::Intercom;
use crate::provider::kissmetrics::Kissmetrics;
use crate::provider::mixpanel::Mixpanel;
use crate::provider::olark::Olark;
use crate::provider::types::Provider;

/// The closed catalog of providers that _can_ be enabled. Adapters are built
/// once at first use and live for the rest of the process.
static REGISTRY: LazyLock<HashMap<&'static str, Arc<dyn Provider>>> = LazyLock::new(|| {
    let catalog: Vec<Arc<dyn Provider>> = vec![
        Arc::new(GoogleAnalytics::new()),
        Arc::new(Kissmetrics::new()),
        Arc::new(Mixpanel::new()),
        Arc::new(Intercom::new()),
        Arc::new(CustomerIo::new()),
        Arc::new(CrazyEgg::new()),
        Arc::new(Olark::new()),
        Arc::new(Chartbeat::new()),
    ];
    catalog
        .into_iter()
        .map(|provider| (provider.name(), provider))
        .collect()
});

pub fn lookup(name: &str) -> Option<Arc<dyn Provider>> {
    REGISTRY.get(name).cloned()
}

pub fn available_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}
