//! The canonical error record and its single construction path
//!
//! Every fault the engine sees becomes exactly one `ErrorInfo`. The record's
//! `error_id` is a deterministic 16-hex-character digest over the fault's type,
//! message, and context identity fields; the timestamp is deliberately not an
//! input, so the same fault from the same call site maps to the same id while
//! near-duplicates stay distinguishable. Collisions are tolerable-rare, not
//! cryptographically excluded.

use crate::context::ErrorContext;
use crate::taxonomy::{Category, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Default retry budget for a record unless the caller overrides it.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Number of hex characters in an `error_id`.
const ERROR_ID_LEN: usize = 16;

/// Canonical record of one reported fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Deterministic 16-hex-character digest identifying this fault shape
    pub error_id: String,
    /// Name of the originating fault kind
    pub error_type: String,
    /// Rendered fault message
    pub error_message: String,
    pub severity: Severity,
    pub category: Category,
    pub context: ErrorContext,
    pub timestamp: DateTime<Utc>,
    /// Attempts already made; only ever increases
    pub retry_count: u32,
    pub max_retries: u32,
    /// Rendered `Error::source()` chain, diagnostic only. This stands in for
    /// a reference to the original fault, which is not retained.
    pub trace: Option<String>,
}

impl ErrorInfo {
    /// Build a record from a raised fault. This is the only construction path
    /// that derives `error_type` and the diagnostic trace from the fault.
    pub fn from_fault<E>(
        fault: &E,
        context: ErrorContext,
        severity: Severity,
        category: Category,
    ) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let error_type = short_type_name(std::any::type_name::<E>());
        let error_message = fault.to_string();
        let trace = render_source_chain(fault);
        Self::from_parts(error_type, error_message, severity, category, context, trace)
    }

    /// Build a record from already-rendered fault parts.
    pub fn from_parts(
        error_type: impl Into<String>,
        error_message: impl Into<String>,
        severity: Severity,
        category: Category,
        context: ErrorContext,
        trace: Option<String>,
    ) -> Self {
        let error_type = error_type.into();
        let error_message = error_message.into();
        let error_id = compute_error_id(&error_type, &error_message, &context);
        Self {
            error_id,
            error_type,
            error_message,
            severity,
            category,
            context,
            timestamp: Utc::now(),
            retry_count: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            trace,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Whether the engine's automatic retry path may attempt this fault again.
    pub fn can_retry(&self) -> bool {
        self.severity != Severity::Fatal && self.retry_count < self.max_retries
    }

    /// Whether this fault must abort without any retry.
    pub fn should_fail_fast(&self) -> bool {
        self.severity == Severity::Fatal
    }

    /// Count one more attempt. Callers increment before re-checking
    /// `can_retry`, so the count never passes `max_retries` by contract.
    pub fn record_attempt(&mut self) {
        self.retry_count = self.retry_count.saturating_add(1);
    }
}

/// Digest over the fault's identity: type, message, and context identity
/// fields. Timestamp-insensitive by design.
fn compute_error_id(error_type: &str, error_message: &str, context: &ErrorContext) -> String {
    let mut hasher = Sha256::new();
    hasher.update(error_type.as_bytes());
    hasher.update([0u8]);
    hasher.update(error_message.as_bytes());
    hasher.update([0u8]);
    hasher.update(context.component.as_bytes());
    hasher.update([0u8]);
    hasher.update(context.operation.as_bytes());
    for field in [&context.session_id, &context.user_id, &context.correlation_id] {
        hasher.update([0u8]);
        if let Some(value) = field {
            hasher.update(value.as_bytes());
        }
    }
    let digest = hasher.finalize();
    hex::encode(&digest[..ERROR_ID_LEN / 2])
}

/// Strip the module path off a `std::any::type_name` rendering.
fn short_type_name(full: &str) -> String {
    full.rsplit("::").next().unwrap_or(full).to_string()
}

/// Render the `source()` chain, innermost last. `None` when the fault has no
/// underlying cause.
fn render_source_chain<E>(fault: &E) -> Option<String>
where
    E: std::error::Error + ?Sized,
{
    let mut lines = Vec::new();
    let mut current = fault.source();
    while let Some(cause) = current {
        lines.push(format!("caused by: {}", cause));
        current = cause.source();
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
