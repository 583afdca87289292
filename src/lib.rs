//! Taxonomy-driven error handling and recovery engine
//!
//! Faultline records faults, classifies them through a chain of pluggable
//! recovery handlers, and orchestrates retry/fallback around risky
//! operations. It keeps a bounded in-memory history with running aggregates
//! and exports a diagnostics snapshot for external health collaborators.
//!
//! ## Design principles
//!
//! - **Data over unwinding**: faults become `ErrorInfo` records tagged with a
//!   severity and category; retry and fallback logic branches on that data,
//!   never on panics or downcasts.
//! - **First match wins**: handlers are consulted in registration order and
//!   the first `can_handle` claim decides retry eligibility and remediation.
//! - **Bookkeeping never fails the caller**: handler panics are contained and
//!   persistence is best-effort on a background task.
//!
//! ## Usage
//!
//! ```rust
//! use faultline::{Category, ErrorContext, ErrorHandlingEngine, Severity};
//!
//! let engine = ErrorHandlingEngine::new();
//! let fault = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "peer reset");
//!
//! let record = engine.handle_error(
//!     &fault,
//!     ErrorContext::new("gateway", "forward_request"),
//!     Severity::Medium,
//!     Category::Network,
//! );
//!
//! assert_eq!(record.error_id.len(), 16);
//! assert!(record.can_retry());
//! ```

pub mod config;
pub mod context;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod handler;
pub mod persistence;
pub mod record;
pub mod recovery;
pub mod stats;
pub mod taxonomy;

pub use config::EngineConfig;
pub use context::ErrorContext;
pub use diagnostics::DiagnosticsSnapshot;
pub use engine::{ErrorHandlingEngine, FallbackOptions};
pub use error::{FaultlineError, FaultlineResult};
pub use handler::{
    ErrorHandler, IntegrationErrorHandler, NetworkErrorHandler, SystemErrorHandler,
    ValidationErrorHandler,
};
pub use persistence::{FileBackend, MemoryBackend, NullBackend, PersistenceBackend};
pub use record::{ErrorInfo, DEFAULT_MAX_RETRIES};
pub use recovery::{RecoveryAction, RecoveryStrategy};
pub use stats::ErrorStatistics;
pub use taxonomy::{Category, Severity};
