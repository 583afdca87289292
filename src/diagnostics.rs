//! Diagnostics export
//!
//! The snapshot is the one surface external health/alerting collaborators
//! consume; the engine knows nothing about them. Everything here serializes
//! so collectors can ship it as JSON.

use crate::record::ErrorInfo;
use crate::stats::ErrorStatistics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of the engine's identity, counters, and recent records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsSnapshot {
    pub engine_name: String,
    pub max_history_size: usize,
    pub errors_in_history: usize,
    pub errors_in_cache: usize,
    pub statistics: ErrorStatistics,
    /// Most recent records, newest first
    pub recent_errors: Vec<ErrorInfo>,
    pub generated_at: DateTime<Utc>,
}
