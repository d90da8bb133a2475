use tokio::time::Duration;
use tracing::warn;
use crate::persist::DEFAULT_PERSIST_TIMEOUT;

pub const PERSISTENCE_KEY: &str = "PERSISTENCE";
pub const REHYDRATE_KEY: &str = "REHYDRATE";
pub const PERSIST_TIMEOUT_KEY: &str = "PERSIST_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub persistence: bool,
    pub rehydrate: bool,
    pub persist_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            persistence: true,
            rehydrate: true,
            persist_timeout: DEFAULT_PERSIST_TIMEOUT,
        }
    }
}

fn switch(value: Option<String>, key: &str, default: bool) -> bool {
    match value.as_deref().map(str::trim) {
        None => default,
        Some(v) if v.eq_ignore_ascii_case("on") || v.eq_ignore_ascii_case("true") => true,
        Some(v) if v.eq_ignore_ascii_case("off") || v.eq_ignore_ascii_case("false") => false,
        Some(v) => {
            warn!("Ignoring {}={:?}, expected on/off", key, v);
            default
        }
    }
}

impl Settings {
    /// Builds settings from a key lookup such as the shuttle secret store.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let persist_timeout = match lookup(PERSIST_TIMEOUT_KEY) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    warn!("Ignoring {}={:?}, expected a positive number of milliseconds", PERSIST_TIMEOUT_KEY, raw);
                    defaults.persist_timeout
                }
            },
            None => defaults.persist_timeout,
        };

        Self {
            persistence: switch(lookup(PERSISTENCE_KEY), PERSISTENCE_KEY, defaults.persistence),
            rehydrate: switch(lookup(REHYDRATE_KEY), REHYDRATE_KEY, defaults.rehydrate),
            persist_timeout,
        }
    }
}
