//! Recovery strategies and executable remediation steps
//!
//! A `RecoveryAction` pairs a strategy tag with a named executable step.
//! Handlers return ordered action lists; whether and when to run them is the
//! caller's call. `execute()` is a hard boundary: a failing or panicking
//! executor becomes a `false` return, never an escaping fault.

use crate::error::FaultlineResult;
use crate::record::ErrorInfo;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Kind of remediation a `RecoveryAction` represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecoveryStrategy {
    /// Attempt the operation again
    Retry,
    /// Switch to an alternative path
    Fallback,
    /// Stop attempting for a cooling-off period
    CircuitBreaker,
    /// Abort deliberately without retry
    FailFast,
    /// Continue with reduced functionality
    GracefulDegradation,
    /// A human has to look at this
    UserIntervention,
}

impl fmt::Display for RecoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryStrategy::Retry => write!(f, "retry"),
            RecoveryStrategy::Fallback => write!(f, "fallback"),
            RecoveryStrategy::CircuitBreaker => write!(f, "circuit_breaker"),
            RecoveryStrategy::FailFast => write!(f, "fail_fast"),
            RecoveryStrategy::GracefulDegradation => write!(f, "graceful_degradation"),
            RecoveryStrategy::UserIntervention => write!(f, "user_intervention"),
        }
    }
}

type RecoveryFn = Arc<dyn Fn(&ErrorInfo) -> FaultlineResult<bool> + Send + Sync>;

/// A named, executable remediation step tagged with its strategy.
#[derive(Clone)]
pub struct RecoveryAction {
    pub strategy: RecoveryStrategy,
    pub action_name: String,
    pub description: String,
    executor: RecoveryFn,
}

impl fmt::Debug for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryAction")
            .field("strategy", &self.strategy)
            .field("action_name", &self.action_name)
            .field("description", &self.description)
            .field("executor", &"<closure>")
            .finish()
    }
}

impl RecoveryAction {
    /// Create an action with a custom executor.
    pub fn new<F>(
        strategy: RecoveryStrategy,
        action_name: impl Into<String>,
        description: impl Into<String>,
        executor: F,
    ) -> Self
    where
        F: Fn(&ErrorInfo) -> FaultlineResult<bool> + Send + Sync + 'static,
    {
        Self {
            strategy,
            action_name: action_name.into(),
            description: description.into(),
            executor: Arc::new(executor),
        }
    }

    /// Create an advisory action: it logs the recommendation and reports
    /// success. The built-in handlers use these to describe what a caller
    /// should do without taking the step themselves.
    pub fn advisory(
        strategy: RecoveryStrategy,
        action_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let action_name = action_name.into();
        let log_name = action_name.clone();
        Self::new(strategy, action_name, description, move |error| {
            debug!(
                action = %log_name,
                error_id = %error.error_id,
                "recovery action recommended"
            );
            Ok(true)
        })
    }

    /// Run the step. Executor faults and panics are contained and reported as
    /// `false`; this method never lets an internal failure escape.
    pub fn execute(&self, error: &ErrorInfo) -> bool {
        let outcome = catch_unwind(AssertUnwindSafe(|| (self.executor)(error)));
        match outcome {
            Ok(Ok(success)) => success,
            Ok(Err(e)) => {
                warn!(
                    action = %self.action_name,
                    error_id = %error.error_id,
                    "recovery action failed: {}",
                    e
                );
                false
            }
            Err(_) => {
                warn!(
                    action = %self.action_name,
                    error_id = %error.error_id,
                    "recovery action panicked"
                );
                false
            }
        }
    }
}
