//! Configuration loading tests

use std::io::Write;

use linkshelf::config::StaticConfig;
use linkshelf::errors::LinkshelfError;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
fn test_missing_file_yields_defaults() {
    let config = StaticConfig::load_from("/nonexistent/linkshelf-config.toml").unwrap();
    assert_eq!(config, StaticConfig::default());
}

#[test]
fn test_partial_file_overrides_only_given_keys() {
    let file = write_config(
        r#"
[links]
code_length = 6
default_click_limit = 3

[notifications]
enabled = false
"#,
    );

    let config = StaticConfig::load_from(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.links.code_length, 6);
    assert_eq!(config.links.default_click_limit, 3);
    assert_eq!(config.links.default_ttl_hours, 24);
    assert!(!config.notifications.enabled);
    assert_eq!(config.notifications.history_capacity, 50);
    assert_eq!(config.sweeper.interval_secs, 3600);
}

#[test]
fn test_invalid_values_rejected() {
    let file = write_config(
        r#"
[links]
default_ttl_hours = 0
"#,
    );

    let err = StaticConfig::load_from(file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, LinkshelfError::Config(_)));
}

#[test]
fn test_out_of_range_values_rejected() {
    // 超出时间范围的 TTL
    let file = write_config(
        r#"
[links]
default_ttl_hours = 3000000000
"#,
    );
    let err = StaticConfig::load_from(file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, LinkshelfError::Config(_)));

    let file = write_config(
        r#"
[links]
code_length = 65
"#,
    );
    let err = StaticConfig::load_from(file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, LinkshelfError::Config(_)));
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = write_config("[links\ncode_length = ");
    let err = StaticConfig::load_from(file.path().to_str().unwrap()).unwrap_err();
    assert!(matches!(err, LinkshelfError::Config(_)));
}

#[test]
fn test_sample_config_is_loadable() {
    let file = write_config(&StaticConfig::generate_sample_config());
    let config = StaticConfig::load_from(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config, StaticConfig::default());
}
