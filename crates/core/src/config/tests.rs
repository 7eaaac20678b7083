use std::io::Write;

use super::*;
use crate::logging::{LogFormat, LogLevel};

const FULL_CONFIG: &str = r#"
[database]
url = "postgres://periodic@localhost/periodic"
max_connections = 8
min_connections = 2
connection_timeout_seconds = 10

[node]
name = "node1"

[executor]
task_timeout_seconds = 120

[observability]
log_level = "debug"
log_format = "json"
"#;

#[test]
fn test_from_toml_full() {
    let config = AppConfig::from_toml(FULL_CONFIG).unwrap();
    assert_eq!(config.database.max_connections, 8);
    assert_eq!(config.database.backend(), Some(DatabaseBackend::Postgres));
    assert_eq!(config.node.name, "node1");
    assert_eq!(config.executor.task_timeout_seconds, 120);
    assert_eq!(config.observability.log_format, "json");
}

#[test]
fn test_from_toml_partial_uses_defaults() {
    let config = AppConfig::from_toml(
        r#"
[node]
name = "edge-7"
"#,
    )
    .unwrap();
    assert_eq!(config.node.name, "edge-7");
    assert_eq!(config.database.url, DatabaseConfig::default().url);
    assert_eq!(config.executor.task_timeout_seconds, 3600);
    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn test_invalid_log_level_rejected() {
    let result = AppConfig::from_toml(
        r#"
[node]
name = "node1"

[observability]
log_level = "loud"
log_format = "pretty"
"#,
    );
    assert!(result.is_err());
}

#[test]
fn test_log_settings_are_normalized() {
    let config = AppConfig::from_toml(
        r#"
[node]
name = "node1"

[observability]
log_level = "warning"
log_format = "Pretty"
"#,
    )
    .unwrap();

    let level = config.observability.level().unwrap();
    assert_eq!(level, LogLevel::Warn);
    // EnvFilter 只认识规范写法，"warning" 会被当成 target 名称
    assert_eq!(level.as_filter(), "warn");
    assert_eq!(config.observability.format().unwrap(), LogFormat::Pretty);
}

#[test]
fn test_empty_node_name_accepted() {
    let config = AppConfig::from_toml(
        r#"
[node]
name = ""
"#,
    )
    .unwrap();
    let resolver = crate::NodeResolver::from_config(&config.node);
    assert_eq!(resolver.resolve(Some("node1")).unwrap(), "node1");
    assert!(resolver.resolve(None).is_err());
}

#[test]
fn test_toml_roundtrip() {
    let config = AppConfig::from_toml(FULL_CONFIG).unwrap();
    let serialized = config.to_toml().unwrap();
    let reparsed = AppConfig::from_toml(&serialized).unwrap();
    assert_eq!(reparsed.node.name, config.node.name);
    assert_eq!(reparsed.database.url, config.database.url);
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(FULL_CONFIG.as_bytes()).unwrap();

    let path = file.path().to_str().unwrap().to_string();
    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.database.min_connections, 2);
    assert_eq!(config.executor.task_timeout_seconds, 120);
}

#[test]
fn test_load_missing_file_fails() {
    let result = AppConfig::load(Some("/nonexistent/periodic.toml"));
    assert!(result.is_err());
}
