//! Tests for error types

use prometheus_async_op::core::{OperationFailure, OperationId, RegistryError};

#[test]
fn test_operation_failure_display() {
    let err = OperationFailure::new(-6, "insufficient funds");
    assert_eq!(format!("{}", err), "insufficient funds (code -6)");
}

#[test]
fn test_registry_full_error() {
    let err = RegistryError::Full { limit: 3 };
    assert_eq!(format!("{}", err), "registry full: 3 operations tracked");
}

#[test]
fn test_invalid_id_error() {
    let err = "opid-xyz".parse::<OperationId>().unwrap_err();
    assert_eq!(format!("{}", err), "invalid operation id: opid-xyz");
}

#[test]
fn test_invalid_config_error() {
    let err = RegistryError::InvalidConfig("max_tracked must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: max_tracked must be greater than 0"
    );
}
