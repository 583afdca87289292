//! Severity and category taxonomy for recorded faults
//!
//! Severity is ordinal and governs retry eligibility; category classifies the
//! fault's origin and governs which handler in the chain applies. Neither is
//! ever derived from the fault payload itself: the reporting caller classifies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal urgency of a recorded fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Expected, recoverable noise
    Low,
    /// Degraded but functional
    Medium,
    /// Operation failed and needs attention
    High,
    /// Unrecoverable; never retried
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "LOW"),
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Origin classification of a recorded fault.
///
/// The set is open: `Other` carries categories this crate has no built-in
/// handler for, and custom handlers may claim them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Defective caller or user input
    Validation,
    /// A dependency or third-party integration misbehaved
    Integration,
    /// Transport-level failure
    Network,
    /// Infrastructure or internal failure
    System,
    /// Anything outside the built-in taxonomy
    Other(String),
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Validation => write!(f, "VALIDATION"),
            Category::Integration => write!(f, "INTEGRATION"),
            Category::Network => write!(f, "NETWORK"),
            Category::System => write!(f, "SYSTEM"),
            Category::Other(name) => write!(f, "{}", name),
        }
    }
}
