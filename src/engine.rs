//! The error handling engine facade
//!
//! Callers report faults here; the engine classifies them through the handler
//! chain, folds them into statistics, keeps a bounded FIFO history with an
//! id-keyed cache mirror, persists best-effort in the background, and drives
//! the retry/fallback orchestration. Its one hard invariant: bookkeeping
//! failure never costs a caller its control flow.
//!
//! ## Concurrency
//!
//! History, cache, and statistics share a single mutex so `total_errors` is
//! exactly the number of successful `handle_error` calls and FIFO ordering
//! holds under concurrent reporters. Persistence runs on a spawned task
//! outside the critical section; a slow filesystem never serializes callers
//! behind the lock. Eviction is synchronous, inline with insertion.

use crate::config::EngineConfig;
use crate::context::ErrorContext;
use crate::diagnostics::DiagnosticsSnapshot;
use crate::handler::{
    ErrorHandler, IntegrationErrorHandler, NetworkErrorHandler, SystemErrorHandler,
    ValidationErrorHandler,
};
use crate::persistence::{FileBackend, NullBackend, PersistenceBackend};
use crate::record::ErrorInfo;
use crate::recovery::RecoveryAction;
use crate::stats::ErrorStatistics;
use crate::taxonomy::{Category, Severity};
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Options for one `handle_error_with_fallback` invocation.
///
/// The caller classifies the wrapped operation once (severity/category stamp
/// every recorded attempt) and bounds the retry loop both in count and,
/// optionally, in accumulated delay.
#[derive(Debug, Clone)]
pub struct FallbackOptions {
    /// Total operation attempts before the fallback runs
    pub max_retries: u32,
    pub severity: Severity,
    pub category: Category,
    /// Delay between attempts
    pub retry_delay: Duration,
    /// Deadline on accumulated delay; exceeding it stops retrying early
    pub max_total_delay: Option<Duration>,
}

impl Default for FallbackOptions {
    fn default() -> Self {
        Self {
            max_retries: 3,
            severity: Severity::Medium,
            category: Category::System,
            retry_delay: Duration::from_millis(100),
            max_total_delay: None,
        }
    }
}

impl FallbackOptions {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    pub fn with_classification(mut self, severity: Severity, category: Category) -> Self {
        self.severity = severity;
        self.category = category;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_max_total_delay(mut self, deadline: Duration) -> Self {
        self.max_total_delay = Some(deadline);
        self
    }
}

struct EngineState {
    history: VecDeque<ErrorInfo>,
    cache: HashMap<String, ErrorInfo>,
    stats: ErrorStatistics,
}

/// Facade over the taxonomy, handler chain, bounded history, and persistence.
pub struct ErrorHandlingEngine {
    config: EngineConfig,
    handlers: RwLock<Vec<Arc<dyn ErrorHandler>>>,
    state: Mutex<EngineState>,
    persistence: Arc<dyn PersistenceBackend>,
}

impl ErrorHandlingEngine {
    /// Engine with default configuration and the four built-in handlers.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Engine from explicit configuration. Installs the built-in handlers in
    /// their canonical order (validation, integration, network, system) and a
    /// file backend when `error_dir` is set.
    pub fn with_config(config: EngineConfig) -> Self {
        let persistence: Arc<dyn PersistenceBackend> = match &config.error_dir {
            Some(dir) => Arc::new(FileBackend::new(dir.clone())),
            None => Arc::new(NullBackend),
        };
        let handlers: Vec<Arc<dyn ErrorHandler>> = vec![
            Arc::new(ValidationErrorHandler),
            Arc::new(IntegrationErrorHandler),
            Arc::new(NetworkErrorHandler),
            Arc::new(SystemErrorHandler),
        ];
        Self {
            config,
            handlers: RwLock::new(handlers),
            state: Mutex::new(EngineState {
                history: VecDeque::new(),
                cache: HashMap::new(),
                stats: ErrorStatistics::new(),
            }),
            persistence,
        }
    }

    /// Swap in a persistence backend (tests inject `MemoryBackend` here).
    pub fn with_persistence(mut self, backend: Arc<dyn PersistenceBackend>) -> Self {
        self.persistence = backend;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Append a handler to the chain. Dispatch is first-registered-wins, so a
    /// custom handler only sees records the earlier handlers do not claim.
    pub fn register_handler(&self, handler: Arc<dyn ErrorHandler>) {
        self.handlers.write().push(handler);
    }

    /// Replace the whole chain, e.g. to front-run the built-in handlers.
    pub fn with_handlers(self, handlers: Vec<Arc<dyn ErrorHandler>>) -> Self {
        *self.handlers.write() = handlers;
        self
    }

    /// Record a fault the caller has already dealt with (or is about to).
    ///
    /// Builds the canonical record, consults the handler chain, updates
    /// statistics and the bounded history, kicks off best-effort persistence,
    /// and emits one structured log event. Returns the record for inspection.
    pub fn handle_error<E>(
        &self,
        fault: &E,
        context: ErrorContext,
        severity: Severity,
        category: Category,
    ) -> ErrorInfo
    where
        E: std::error::Error + ?Sized,
    {
        let info = ErrorInfo::from_fault(fault, context, severity, category)
            .with_max_retries(self.config.default_max_retries);
        self.record(info).0
    }

    /// Insert a pre-built record. `handle_error` is the normal entry point;
    /// this exists for callers that render faults themselves.
    pub fn record_error(&self, info: ErrorInfo) -> ErrorInfo {
        self.record(info).0
    }

    fn record(&self, info: ErrorInfo) -> (ErrorInfo, Option<bool>) {
        let decision = self.handler_decision(&info);

        {
            let mut state = self.state.lock();
            state.stats.update_from_error(&info);
            state.history.push_back(info.clone());
            state.cache.insert(info.error_id.clone(), info.clone());
            if state.history.len() > self.config.max_history_size {
                if let Some(evicted) = state.history.pop_front() {
                    // ids are timestamp-insensitive, so a duplicate of the
                    // evicted record may still sit in history under the same
                    // id; only drop the cache entry once the last one goes
                    let still_present = state
                        .history
                        .iter()
                        .any(|record| record.error_id == evicted.error_id);
                    if !still_present {
                        state.cache.remove(&evicted.error_id);
                    }
                }
            }
        }

        self.spawn_persist(info.clone());
        self.log_record(&info, decision);
        (info, decision)
    }

    /// First-match handler decision: is this worth auto-retrying right now?
    /// `None` when no registered handler claims the record, or the claiming
    /// handler panicked.
    fn handler_decision(&self, info: &ErrorInfo) -> Option<bool> {
        let handlers = self.handlers.read();
        for handler in handlers.iter() {
            let claims =
                contained(handler.name(), "can_handle", || handler.can_handle(info))?;
            if claims {
                return contained(handler.name(), "handle", || handler.handle(info));
            }
        }
        None
    }

    /// Ordered remediation steps from the first handler claiming the record.
    /// Empty when nothing claims it; a panicking handler yields empty too.
    pub fn recovery_actions(&self, info: &ErrorInfo) -> Vec<RecoveryAction> {
        let handlers = self.handlers.read();
        for handler in handlers.iter() {
            let claims = contained(handler.name(), "can_handle", || handler.can_handle(info));
            match claims {
                Some(true) => {
                    return contained(handler.name(), "recovery_actions", || {
                        handler.recovery_actions(info)
                    })
                    .unwrap_or_default()
                }
                Some(false) => continue,
                None => return Vec::new(),
            }
        }
        Vec::new()
    }

    /// Run `operation`, retrying per the handler chain's decision and the
    /// options' bounds; when attempts exhaust, run `fallback` once. A
    /// fallback fault is the one propagated; the operation's faults stay
    /// recorded in history but are not re-raised.
    ///
    /// Retry eligibility comes from the handler chain. A record no registered
    /// handler claims, such as a custom `Category::Other`, gets zero retries
    /// and goes straight to the fallback after the first failure; register a
    /// handler for that category to opt in to retries.
    pub async fn handle_error_with_fallback<T, E, Op, OpFut, Fb, FbFut>(
        &self,
        mut operation: Op,
        fallback: Fb,
        context: ErrorContext,
        options: FallbackOptions,
    ) -> Result<T, E>
    where
        E: std::error::Error,
        Op: FnMut() -> OpFut,
        OpFut: Future<Output = Result<T, E>>,
        Fb: FnOnce() -> FbFut,
        FbFut: Future<Output = Result<T, E>>,
    {
        let max_retries = options.max_retries.max(1);
        let mut retry_count: u32 = 0;
        let mut total_delay = Duration::ZERO;

        loop {
            match operation().await {
                Ok(value) => {
                    if retry_count > 0 {
                        debug!(
                            operation = %context.operation,
                            attempts = retry_count + 1,
                            "operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(fault) => {
                    let mut info = ErrorInfo::from_fault(
                        &fault,
                        context.clone(),
                        options.severity,
                        options.category.clone(),
                    )
                    .with_max_retries(max_retries);
                    info.retry_count = retry_count;
                    let (info, decision) = self.record(info);

                    retry_count += 1;
                    if retry_count >= max_retries {
                        break;
                    }
                    if !decision.unwrap_or(false) {
                        debug!(
                            operation = %context.operation,
                            error_id = %info.error_id,
                            "fault not eligible for automatic retry"
                        );
                        break;
                    }

                    total_delay += options.retry_delay;
                    if let Some(deadline) = options.max_total_delay {
                        if total_delay > deadline {
                            warn!(
                                operation = %context.operation,
                                "retry deadline exceeded, falling back"
                            );
                            break;
                        }
                    }
                    sleep(options.retry_delay).await;
                }
            }
        }

        debug!(
            operation = %context.operation,
            attempts = retry_count,
            "retries exhausted, invoking fallback"
        );
        fallback().await
    }

    /// Look a record up by id in the cache mirror.
    pub fn get_error_by_id(&self, error_id: &str) -> Option<ErrorInfo> {
        self.state.lock().cache.get(error_id).cloned()
    }

    /// Most recent records, newest first, at most `limit`.
    pub fn get_recent_errors(&self, limit: usize) -> Vec<ErrorInfo> {
        let state = self.state.lock();
        state.history.iter().rev().take(limit).cloned().collect()
    }

    /// Records attributed to `component`, in insertion order.
    pub fn get_errors_by_component(&self, component: &str) -> Vec<ErrorInfo> {
        let state = self.state.lock();
        state
            .history
            .iter()
            .filter(|record| record.context.component == component)
            .cloned()
            .collect()
    }

    /// Drop every record older than the cutoff from history and cache.
    /// Returns how many were removed; newer records are untouched.
    pub fn clear_old_errors(&self, older_than_hours: u64) -> usize {
        let cutoff = Utc::now() - chrono::Duration::hours(older_than_hours as i64);
        let mut state = self.state.lock();
        let mut retained = VecDeque::with_capacity(state.history.len());
        let mut removed_ids = Vec::new();
        for record in state.history.drain(..).collect::<Vec<_>>() {
            if record.timestamp < cutoff {
                removed_ids.push(record.error_id);
            } else {
                retained.push_back(record);
            }
        }
        let removed = removed_ids.len();
        // a fresh duplicate may share an id with a cleared record; keep the
        // cache entry as long as any bearer remains in history
        for error_id in removed_ids {
            if !retained.iter().any(|record| record.error_id == error_id) {
                state.cache.remove(&error_id);
            }
        }
        state.history = retained;
        removed
    }

    /// Current aggregates.
    pub fn statistics(&self) -> ErrorStatistics {
        self.state.lock().stats.clone()
    }

    /// Explicit reset of the aggregates; history and cache are untouched.
    pub fn reset_statistics(&self) {
        self.state.lock().stats.reset();
    }

    /// Serializable snapshot for external health/alerting collaborators,
    /// carrying at most the configured number of recent records.
    pub fn export_diagnostics(&self) -> DiagnosticsSnapshot {
        let state = self.state.lock();
        let recent_errors: Vec<ErrorInfo> = state
            .history
            .iter()
            .rev()
            .take(self.config.recent_errors_limit)
            .cloned()
            .collect();
        DiagnosticsSnapshot {
            engine_name: self.config.engine_name.clone(),
            max_history_size: self.config.max_history_size,
            errors_in_history: state.history.len(),
            errors_in_cache: state.cache.len(),
            statistics: state.stats.clone(),
            recent_errors,
            generated_at: Utc::now(),
        }
    }

    /// Fire-and-forget persistence. Without a runtime (pure-sync callers in
    /// tests) the write is skipped; the record is already in history either
    /// way.
    fn spawn_persist(&self, record: ErrorInfo) {
        let backend = Arc::clone(&self.persistence);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = backend.persist(&record).await {
                        warn!(
                            error_id = %record.error_id,
                            "failed to persist error record: {}",
                            e
                        );
                    }
                });
            }
            Err(_) => {
                debug!(
                    error_id = %record.error_id,
                    "no async runtime, skipping error record persistence"
                );
            }
        }
    }

    fn log_record(&self, info: &ErrorInfo, decision: Option<bool>) {
        let retriable = decision.unwrap_or(false);
        match info.severity {
            Severity::Low => debug!(
                engine = %self.config.engine_name,
                error_id = %info.error_id,
                component = %info.context.component,
                operation = %info.context.operation,
                category = %info.category,
                retriable,
                "{}",
                info.error_message
            ),
            Severity::Medium => warn!(
                engine = %self.config.engine_name,
                error_id = %info.error_id,
                component = %info.context.component,
                operation = %info.context.operation,
                category = %info.category,
                retriable,
                "{}",
                info.error_message
            ),
            Severity::High | Severity::Fatal => error!(
                engine = %self.config.engine_name,
                error_id = %info.error_id,
                component = %info.context.component,
                operation = %info.context.operation,
                category = %info.category,
                severity = %info.severity,
                retriable,
                "{}",
                info.error_message
            ),
        }
    }
}

impl Default for ErrorHandlingEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a handler call, containing panics. A panicking handler must never take
/// the engine down with it.
fn contained<T>(handler: &str, method: &str, f: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(handler, method, "handler panicked, treating as no decision");
            None
        }
    }
}
