//! Tests for the status report wire shape

use prometheus_async_op::core::{
    OperationFailure, OperationId, OperationState, OperationStatus, ProbeReading,
};
use serde_json::json;

fn base(status: OperationState) -> OperationStatus {
    OperationStatus {
        id: "opid-6f1c2a8e-4b7d-4e21-9a3f-0c5d8e7b1a42".parse::<OperationId>().unwrap(),
        status,
        creation_time: 1_700_000_000,
        error: None,
        result: None,
        execution_secs: None,
        probe: None,
    }
}

#[test]
fn test_failed_report_shape() {
    let mut status = base(OperationState::Failed);
    status.error = Some(OperationFailure::new(123, "boom"));
    assert_eq!(
        status.to_value(),
        json!({
            "id": "opid-6f1c2a8e-4b7d-4e21-9a3f-0c5d8e7b1a42",
            "status": "failed",
            "creation_time": 1_700_000_000,
            "error": { "code": 123, "message": "boom" }
        })
    );
}

#[test]
fn test_success_report_shape() {
    let mut status = base(OperationState::Success);
    status.result = Some(json!(["a", 1]));
    status.execution_secs = Some(0.5);
    status.probe = Some(ProbeReading {
        name: "cpu_ns".into(),
        units: None,
    });
    assert_eq!(
        status.to_value(),
        json!({
            "id": "opid-6f1c2a8e-4b7d-4e21-9a3f-0c5d8e7b1a42",
            "status": "success",
            "creation_time": 1_700_000_000,
            "result": ["a", 1],
            "execution_secs": 0.5,
            "probe": { "name": "cpu_ns", "units": null }
        })
    );
}

#[test]
fn test_report_parses_back() {
    let json = r#"{
        "id": "opid-6f1c2a8e-4b7d-4e21-9a3f-0c5d8e7b1a42",
        "status": "executing",
        "creation_time": 1700000000
    }"#;
    let status: OperationStatus = serde_json::from_str(json).unwrap();
    assert_eq!(status, base(OperationState::Executing));
}
