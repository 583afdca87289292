//! Attribution metadata attached to recorded faults
//!
//! `ErrorContext` identifies *where* a fault occurred (component, operation,
//! session) so history can be filtered and correlated. It is purely
//! descriptive and never drives the engine's control flow.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Immutable attribution metadata for a recorded fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Component or service where the fault originated
    pub component: String,
    /// Operation that was being performed
    pub operation: String,
    /// Session the operation ran under, if any
    pub session_id: Option<String>,
    /// Acting user, if any
    pub user_id: Option<String>,
    /// Correlation id for tracking related faults across components
    pub correlation_id: Option<String>,
    /// Open string-keyed metadata for anything else worth attributing
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ErrorContext {
    /// Create a context for a component/operation pair.
    pub fn new(component: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            operation: operation.into(),
            session_id: None,
            user_id: None,
            correlation_id: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Mint a fresh v4 correlation id.
    pub fn with_new_correlation_id(mut self) -> Self {
        self.correlation_id = Some(Uuid::new_v4().to_string());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
