//! Configuration from environment.

use std::env;
use std::path::PathBuf;

use crate::here::HereConfig;

pub const DEFAULT_STORE_PATH: &str = "blockages.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub here: HereConfig,
    pub store_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            here: HereConfig::default(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl Config {
    /// Reads `HERE_ROUTER_URL`, `HERE_API_KEY`, `HERE_TIMEOUT_SECS` and
    /// `BLOCKAGE_STORE_PATH`. Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        Self {
            here: HereConfig {
                base_url: lookup("HERE_ROUTER_URL").unwrap_or(defaults.here.base_url),
                api_key: lookup("HERE_API_KEY").unwrap_or(defaults.here.api_key),
                timeout_secs: lookup("HERE_TIMEOUT_SECS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.here.timeout_secs),
            },
            store_path: lookup("BLOCKAGE_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
        }
    }
}
