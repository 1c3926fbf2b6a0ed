use std::collections::HashMap;
use std::path::PathBuf;

use task_scheduler::{AppConfig, ConfigError};

fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn defaults_apply_when_nothing_is_set() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.port, 7540);
    assert_eq!(config.db_file, PathBuf::from("scheduler.db"));
    assert_eq!(config.task_limit, 50);
    assert_eq!(config.listen_addr().port(), 7540);
}

#[test]
fn environment_values_override_defaults() {
    let config = config_from(&[
        ("TODO_PORT", "8080"),
        ("TODO_DBFILE", "/tmp/tasks.db"),
        ("TODO_TASK_LIMIT", "10"),
    ])
    .unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.db_file, PathBuf::from("/tmp/tasks.db"));
    assert_eq!(config.task_limit, 10);
}

#[test]
fn blank_values_keep_defaults() {
    let config = config_from(&[("TODO_PORT", "  "), ("TODO_DBFILE", "")]).unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn invalid_numbers_are_rejected() {
    assert!(matches!(
        config_from(&[("TODO_PORT", "seventy")]),
        Err(ConfigError::Invalid { name: "TODO_PORT", .. })
    ));
    assert!(matches!(
        config_from(&[("TODO_PORT", "70000")]),
        Err(ConfigError::Invalid { name: "TODO_PORT", .. })
    ));
    assert!(matches!(
        config_from(&[("TODO_TASK_LIMIT", "0")]),
        Err(ConfigError::Invalid { name: "TODO_TASK_LIMIT", .. })
    ));
}
