//! Running aggregates over recorded faults
//!
//! Counts only ever move up via `update_from_error`; the sole way down is an
//! explicit `reset`. Keys are the rendered severity/category names so the
//! whole structure serializes cleanly for diagnostics export.

use crate::record::ErrorInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorStatistics {
    pub total_errors: u64,
    pub by_severity: HashMap<String, u64>,
    pub by_category: HashMap<String, u64>,
    pub by_component: HashMap<String, u64>,
    pub last_updated: DateTime<Utc>,
}

impl Default for ErrorStatistics {
    fn default() -> Self {
        Self {
            total_errors: 0,
            by_severity: HashMap::new(),
            by_category: HashMap::new(),
            by_component: HashMap::new(),
            last_updated: Utc::now(),
        }
    }
}

impl ErrorStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the aggregates. Purely additive.
    pub fn update_from_error(&mut self, error: &ErrorInfo) {
        self.total_errors += 1;
        *self
            .by_severity
            .entry(error.severity.to_string())
            .or_insert(0) += 1;
        *self
            .by_category
            .entry(error.category.to_string())
            .or_insert(0) += 1;
        *self
            .by_component
            .entry(error.context.component.clone())
            .or_insert(0) += 1;
        self.last_updated = Utc::now();
    }

    /// Drop all aggregates back to zero.
    pub fn reset(&mut self) {
        self.total_errors = 0;
        self.by_severity.clear();
        self.by_category.clear();
        self.by_component.clear();
        self.last_updated = Utc::now();
    }
}
