//! Configuration file tests

use flownet::{FlowError, RuntimeConfig};
use std::path::PathBuf;
use tempfile::TempDir;

fn sample() -> RuntimeConfig {
    let mut config = RuntimeConfig::default()
        .with_network_id("orders")
        .with_default_capacity(64);
    config.thread_stack_size = Some(256 * 1024);
    config.trace_ports = true;
    config.logging.filter = "warn,flownet=trace".to_string();
    config.logging.file = Some(PathBuf::from("logs/flownet.log"));
    config
}

#[test]
fn test_toml_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("runtime.toml");

    sample().save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("network_id = \"orders\""));

    let loaded = RuntimeConfig::load(&path).unwrap();
    assert_eq!(loaded.network_id.as_deref(), Some("orders"));
    assert_eq!(loaded.default_capacity, 64);
    assert_eq!(loaded.thread_stack_size, Some(256 * 1024));
    assert!(loaded.trace_ports);
    assert!(!loaded.trace_components);
    assert_eq!(loaded.logging.filter, "warn,flownet=trace");
    assert_eq!(loaded.logging.file, Some(PathBuf::from("logs/flownet.log")));
}

#[test]
fn test_json_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("runtime.json");

    sample().save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.trim_start().starts_with('{'));

    let loaded = RuntimeConfig::load(&path).unwrap();
    assert_eq!(loaded.default_capacity, 64);
    assert_eq!(loaded.resolve_network_id(), "orders");
}

#[test]
fn test_load_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "default_capacity = \"lots\"").unwrap();

    let err = RuntimeConfig::load(&path).unwrap_err();
    assert!(matches!(err, FlowError::Config(_)));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("runtime.toml");
    std::fs::write(&path, "network_id = \"   \"").unwrap();

    assert!(matches!(RuntimeConfig::load(&path), Err(FlowError::Config(_))));
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(RuntimeConfig::load(&path).is_err());
    let config = RuntimeConfig::load_or_default(&path);
    assert_eq!(config.default_capacity, RuntimeConfig::default().default_capacity);
    assert!(config.network_id.is_none());
}
