//! Tests for configuration validation

use prometheus_async_op::config::RegistryConfig;

#[test]
fn test_default_config_is_valid() {
    let config = RegistryConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.max_tracked, 10_000);
    assert!(!config.evict_finished);
}

#[test]
fn test_zero_capacity_invalid() {
    let config = RegistryConfig {
        max_tracked: 0,
        evict_finished: true,
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{ "max_tracked": 64, "evict_finished": true }"#;
    let config = RegistryConfig::from_json_str(json).unwrap();
    assert_eq!(config.max_tracked, 64);
    assert!(config.evict_finished);
}

#[test]
fn test_config_from_json_defaults_missing_fields() {
    let config = RegistryConfig::from_json_str("{}").unwrap();
    assert_eq!(config, RegistryConfig::default());
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(RegistryConfig::from_json_str(r#"{ "max_tracked": 0 }"#).is_err());
    assert!(RegistryConfig::from_json_str("not json").is_err());
}
