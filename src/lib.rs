//! # Prometheus Async Op
//!
//! Trackable asynchronous operations for request/poll style APIs.
//!
//! A caller submits long-running work, gets an operation id back at once,
//! and polls the operation's status until it reaches a final state. This
//! crate provides the operation itself: a unique id, a thread-safe
//! lifecycle, timing around the work, and the status report handed back to
//! callers. Deciding which thread runs an operation is left to the host's
//! scheduler.
//!
//! ## Lifecycle
//!
//! ```text
//! queued ──run──▶ executing ──▶ success | failed
//!   └──cancel──▶ cancelled
//! ```
//!
//! Cancellation only takes effect before the work starts. Every accessor
//! is safe to call from any thread while the work runs elsewhere.
//!
//! ## Example
//!
//! ```rust
//! use prometheus_async_op::config::RegistryConfig;
//! use prometheus_async_op::core::{OperationFailure, OperationRegistry};
//! use serde_json::json;
//!
//! let registry = OperationRegistry::new(RegistryConfig::default())?;
//!
//! let pending = registry.submit(|_| Ok(json!({ "txid": "f00d" })))?;
//! let opid = pending.id().to_string();
//!
//! // Hand `pending` to a worker thread; here we run it inline.
//! std::thread::spawn(move || pending.run()).join().unwrap();
//!
//! let status = registry.statuses(&[opid.as_str()]).remove(0);
//! assert_eq!(status.to_value()["status"], "success");
//! assert_eq!(status.result, Some(json!({ "txid": "f00d" })));
//!
//! let failing = registry.submit(|_| Err(OperationFailure::new(-6, "insufficient funds")))?;
//! failing.run();
//! assert_eq!(registry.take_finished::<&str>(&[]).len(), 2);
//! assert!(registry.is_empty());
//! # Ok::<(), prometheus_async_op::core::RegistryError>(())
//! ```

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Operation lifecycle, reporting, and tracking.
pub mod core;
/// Configuration models for the operation registry.
pub mod config;
/// Runtime adapters for dispatching operations.
pub mod runtime;
/// Shared utilities.
pub mod util;
