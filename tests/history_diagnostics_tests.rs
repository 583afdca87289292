//! Integration tests for history, statistics, diagnostics export, and the
//! file persistence backend

use chrono::Utc;
use faultline::{
    Category, EngineConfig, ErrorContext, ErrorHandlingEngine, ErrorInfo, FileBackend,
    PersistenceBackend, Severity,
};
use pretty_assertions::assert_eq;
use std::io;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn report(engine: &ErrorHandlingEngine, component: &str, message: &str) -> ErrorInfo {
    init_tracing();
    let fault = io::Error::new(io::ErrorKind::Other, message.to_string());
    engine.handle_error(
        &fault,
        ErrorContext::new(component, "op"),
        Severity::Medium,
        Category::System,
    )
}

#[tokio::test]
async fn test_history_below_capacity_counts_every_call() {
    let engine = ErrorHandlingEngine::with_config(EngineConfig {
        max_history_size: 8,
        ..Default::default()
    });
    for i in 0..5 {
        report(&engine, "node", &format!("fault {}", i));
    }
    assert_eq!(engine.get_recent_errors(100).len(), 5);
    assert_eq!(engine.statistics().total_errors, 5);
}

#[tokio::test]
async fn test_fifo_eviction_keeps_the_most_recent_capacity() {
    let engine = ErrorHandlingEngine::with_config(EngineConfig {
        max_history_size: 4,
        ..Default::default()
    });
    for i in 0..7 {
        report(&engine, "node", &format!("fault {}", i));
    }

    let recent = engine.get_recent_errors(100);
    assert_eq!(recent.len(), 4);
    let messages: Vec<_> = recent.iter().map(|r| r.error_message.as_str()).collect();
    // newest first: 3..=6 survive, 0..=2 were evicted oldest-first
    assert_eq!(messages, vec!["fault 6", "fault 5", "fault 4", "fault 3"]);
}

#[tokio::test]
async fn test_recent_errors_length_is_min_of_limit_and_history() {
    let engine = ErrorHandlingEngine::with_config(EngineConfig {
        max_history_size: 20,
        recent_errors_limit: 5,
        ..Default::default()
    });
    for i in 0..3 {
        report(&engine, "node", &format!("fault {}", i));
    }
    assert_eq!(engine.get_recent_errors(5).len(), 3);
    assert_eq!(engine.export_diagnostics().recent_errors.len(), 3);

    for i in 3..10 {
        report(&engine, "node", &format!("fault {}", i));
    }
    assert_eq!(engine.get_recent_errors(5).len(), 5);
    assert_eq!(engine.export_diagnostics().recent_errors.len(), 5);
}

#[tokio::test]
async fn test_clear_old_errors_removes_exactly_the_stale_entries() {
    let engine = ErrorHandlingEngine::new();

    for i in 0..3 {
        let mut stale = ErrorInfo::from_parts(
            "IoError",
            format!("stale {}", i),
            Severity::Low,
            Category::System,
            ErrorContext::new("node", "op"),
            None,
        );
        stale.timestamp = Utc::now() - chrono::Duration::hours(30);
        engine.record_error(stale);
    }
    report(&engine, "node", "fresh");

    assert_eq!(engine.clear_old_errors(24), 3);
    let remaining = engine.get_recent_errors(10);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].error_message, "fresh");

    // nothing left to clear
    assert_eq!(engine.clear_old_errors(24), 0);
}

#[tokio::test]
async fn test_diagnostics_snapshot_reflects_engine_state() {
    let engine = ErrorHandlingEngine::with_config(EngineConfig {
        engine_name: "edge-gateway".to_string(),
        max_history_size: 16,
        recent_errors_limit: 3,
        ..Default::default()
    });

    report(&engine, "gateway", "upstream timeout");
    report(&engine, "gateway", "upstream reset");
    report(&engine, "resolver", "lookup failed");

    let snapshot = engine.export_diagnostics();
    assert_eq!(snapshot.engine_name, "edge-gateway");
    assert_eq!(snapshot.max_history_size, 16);
    assert_eq!(snapshot.errors_in_history, 3);
    assert_eq!(snapshot.statistics.total_errors, 3);
    assert_eq!(snapshot.statistics.by_component.get("gateway"), Some(&2));
    assert_eq!(snapshot.recent_errors[0].error_message, "lookup failed");

    // collectors consume this as JSON
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["engine_name"], "edge-gateway");
    assert_eq!(json["statistics"]["total_errors"], 3);
}

#[tokio::test]
async fn test_error_ids_are_16_hex_through_the_engine() {
    let engine = ErrorHandlingEngine::new();
    let info = report(&engine, "node", "any fault");
    assert_eq!(info.error_id.len(), 16);
    assert!(info.error_id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_engine_writes_records_to_configured_directory() {
    let dir = tempfile::tempdir().unwrap();
    let engine = ErrorHandlingEngine::with_config(EngineConfig {
        error_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    });

    let info = report(&engine, "storage", "disk full");

    // the write is fire-and-forget; poll briefly for it to land
    let path = dir.path().join(format!("{}.json", info.error_id));
    for _ in 0..100 {
        if path.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(path.exists());

    let backend = FileBackend::new(dir.path());
    let loaded = backend.load(&info.error_id).await.unwrap();
    assert_eq!(loaded.error_message, "disk full");
    assert_eq!(loaded.context.component, "storage");
}
