//! Operation registry configuration.

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`RegistryConfig::max_tracked`].
pub const MAX_TRACKED_ENV: &str = "ASYNC_OP_MAX_TRACKED";

/// Environment variable overriding [`RegistryConfig::evict_finished`].
pub const EVICT_FINISHED_ENV: &str = "ASYNC_OP_EVICT_FINISHED";

const DEFAULT_MAX_TRACKED: usize = 10_000;

/// Registry limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum number of operations tracked at once.
    #[serde(default = "default_max_tracked")]
    pub max_tracked: usize,
    /// When full, drop the oldest finished operation instead of rejecting
    /// new ones.
    #[serde(default)]
    pub evict_finished: bool,
}

const fn default_max_tracked() -> usize {
    DEFAULT_MAX_TRACKED
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_tracked: DEFAULT_MAX_TRACKED,
            evict_finished: false,
        }
    }
}

impl RegistryConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_tracked == 0 {
            return Err("max_tracked must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from the environment, loading `.env` first if
    /// present. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, String> {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(MAX_TRACKED_ENV) {
            cfg.max_tracked = raw
                .trim()
                .parse()
                .map_err(|e| format!("{MAX_TRACKED_ENV}={raw}: {e}"))?;
        }
        if let Some(raw) = lookup(EVICT_FINISHED_ENV) {
            cfg.evict_finished = raw
                .trim()
                .parse()
                .map_err(|e| format!("{EVICT_FINISHED_ENV}={raw}: {e}"))?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
