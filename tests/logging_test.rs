//! Logging setup tests
//!
//! The global subscriber can only be installed once per process, so these
//! run serially and only the first `init` in this binary succeeds.

use flownet::{logging, LoggingConfig};
use serial_test::serial;
use std::time::Duration;
use tempfile::TempDir;

#[test]
#[serial]
fn test_file_logging_then_second_init_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flownet.log");
    let config = LoggingConfig {
        filter: "debug".to_string(),
        file: Some(path.clone()),
        ansi: false,
        thread_names: true,
    };

    let guard = logging::init(&config).unwrap();
    assert!(guard.is_some());

    tracing::info!(target: "flownet::test", "hello from the logging test");
    // Dropping the guard flushes the non-blocking writer.
    drop(guard);
    std::thread::sleep(Duration::from_millis(50));

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("hello from the logging test"));

    let again = logging::init(&LoggingConfig::default());
    assert!(again.is_err());
}

#[test]
#[serial]
fn test_rejects_file_path_without_name() {
    let config = LoggingConfig {
        file: Some(std::path::PathBuf::from("/")),
        ..LoggingConfig::default()
    };
    assert!(logging::init(&config).is_err());
}
