//! Engine configuration
//!
//! Loaded from TOML with serde defaults so a partial file is enough. Duration
//! fields use human-friendly strings ("100ms", "2s") via humantime.

use crate::error::{FaultlineError, FaultlineResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name reported in logs and diagnostics
    pub engine_name: String,

    /// Bounded history capacity; oldest records are evicted beyond this
    pub max_history_size: usize,

    /// Default retry budget stamped on records built by `handle_error`
    pub default_max_retries: u32,

    /// Delay between attempts in the retry/fallback orchestration
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,

    /// Upper bound on accumulated retry delay; `None` bounds by count only
    #[serde(with = "humantime_serde")]
    pub max_total_delay: Option<Duration>,

    /// How many recent records a diagnostics snapshot carries
    pub recent_errors_limit: usize,

    /// Directory for per-record JSON files; `None` disables file persistence
    pub error_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_name: "faultline".to_string(),
            max_history_size: 500,
            default_max_retries: 3,
            retry_delay: Duration::from_millis(100),
            max_total_delay: None,
            recent_errors_limit: 10,
            error_dir: None,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document. Unset fields take their defaults.
    pub fn from_toml(input: &str) -> FaultlineResult<Self> {
        toml::from_str(input).map_err(|e| FaultlineError::ConfigError {
            message: format!("failed to parse engine config: {}", e),
        })
    }

    /// Load and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> FaultlineResult<Self> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| FaultlineError::ConfigError {
            message: format!("failed to read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml(&input)
    }
}
