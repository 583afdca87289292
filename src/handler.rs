//! Chain-of-responsibility error handlers
//!
//! Handlers decide three things about a record: whether they apply at all
//! (`can_handle`), whether the fault is worth auto-retrying right now
//! (`handle` — the decision, not the retry itself), and which ordered
//! remediation steps apply (`recovery_actions`). The engine consults handlers
//! in registration order and the first `can_handle` match wins.

use crate::record::ErrorInfo;
use crate::recovery::{RecoveryAction, RecoveryStrategy};
use crate::taxonomy::Category;

/// Capability interface for one link in the handler chain.
pub trait ErrorHandler: Send + Sync {
    /// Handler name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Whether this handler applies to the record.
    fn can_handle(&self, error: &ErrorInfo) -> bool;

    /// Whether the fault is worth auto-retrying right now.
    fn handle(&self, error: &ErrorInfo) -> bool;

    /// Ordered remediation steps for the record.
    fn recovery_actions(&self, error: &ErrorInfo) -> Vec<RecoveryAction>;
}

/// Validation faults come from defective input. Retrying identical input is
/// pointless, so the only step is surfacing them to a human.
pub struct ValidationErrorHandler;

impl ErrorHandler for ValidationErrorHandler {
    fn name(&self) -> &str {
        "validation"
    }

    fn can_handle(&self, error: &ErrorInfo) -> bool {
        error.category == Category::Validation
    }

    fn handle(&self, _error: &ErrorInfo) -> bool {
        false
    }

    fn recovery_actions(&self, _error: &ErrorInfo) -> Vec<RecoveryAction> {
        vec![RecoveryAction::advisory(
            RecoveryStrategy::UserIntervention,
            "surface_validation_failure",
            "Report the defective input to the caller; do not retry",
        )]
    }
}

/// Integration faults cover misbehaving dependencies: retry within budget,
/// then switch to an alternative path.
pub struct IntegrationErrorHandler;

impl ErrorHandler for IntegrationErrorHandler {
    fn name(&self) -> &str {
        "integration"
    }

    fn can_handle(&self, error: &ErrorInfo) -> bool {
        error.category == Category::Integration
    }

    fn handle(&self, error: &ErrorInfo) -> bool {
        error.can_retry()
    }

    fn recovery_actions(&self, _error: &ErrorInfo) -> Vec<RecoveryAction> {
        vec![
            RecoveryAction::advisory(
                RecoveryStrategy::Retry,
                "retry_integration",
                "Retry the dependency call within the record's retry budget",
            ),
            RecoveryAction::advisory(
                RecoveryStrategy::Fallback,
                "use_fallback_path",
                "Switch to the configured fallback once retries exhaust",
            ),
        ]
    }
}

/// Network faults are usually transient: retry, and trip a breaker when the
/// peer keeps failing.
pub struct NetworkErrorHandler;

impl ErrorHandler for NetworkErrorHandler {
    fn name(&self) -> &str {
        "network"
    }

    fn can_handle(&self, error: &ErrorInfo) -> bool {
        error.category == Category::Network
    }

    fn handle(&self, error: &ErrorInfo) -> bool {
        error.can_retry()
    }

    fn recovery_actions(&self, _error: &ErrorInfo) -> Vec<RecoveryAction> {
        vec![
            RecoveryAction::advisory(
                RecoveryStrategy::Retry,
                "retry_request",
                "Retry the request within the record's retry budget",
            ),
            RecoveryAction::advisory(
                RecoveryStrategy::CircuitBreaker,
                "open_circuit",
                "Stop calling the peer for a cooling-off period after repeated failures",
            ),
        ]
    }
}

/// System faults follow the generic retry path unless the record is fatal, in
/// which case the only options are aborting cleanly and shedding load.
pub struct SystemErrorHandler;

impl ErrorHandler for SystemErrorHandler {
    fn name(&self) -> &str {
        "system"
    }

    fn can_handle(&self, error: &ErrorInfo) -> bool {
        error.category == Category::System
    }

    fn handle(&self, error: &ErrorInfo) -> bool {
        if error.should_fail_fast() {
            return false;
        }
        error.can_retry()
    }

    fn recovery_actions(&self, error: &ErrorInfo) -> Vec<RecoveryAction> {
        if error.should_fail_fast() {
            vec![
                RecoveryAction::advisory(
                    RecoveryStrategy::FailFast,
                    "abort_operation",
                    "Abort immediately; the fault is unrecoverable",
                ),
                RecoveryAction::advisory(
                    RecoveryStrategy::GracefulDegradation,
                    "degrade_service",
                    "Keep serving with reduced functionality while the fault is investigated",
                ),
            ]
        } else {
            vec![
                RecoveryAction::advisory(
                    RecoveryStrategy::Retry,
                    "retry_operation",
                    "Retry the operation within the record's retry budget",
                ),
                RecoveryAction::advisory(
                    RecoveryStrategy::GracefulDegradation,
                    "degrade_service",
                    "Fall back to reduced functionality if retries exhaust",
                ),
            ]
        }
    }
}
