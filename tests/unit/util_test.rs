//! Tests for utility functions

use prometheus_async_op::util::{init_tracing, now_secs, DEFAULT_LOG_FILTER};

#[test]
fn test_clock_is_after_2020() {
    assert!(now_secs() > 1_577_836_800);
}

#[test]
fn test_default_filter_targets_crate() {
    assert!(DEFAULT_LOG_FILTER.starts_with("prometheus_async_op="));
}

#[test]
fn test_init_tracing_twice() {
    init_tracing();
    init_tracing();
}
