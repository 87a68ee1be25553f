//! Unit-level tests for public helpers, grouped under `tests/unit/`.

mod unit;
