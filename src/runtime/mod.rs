//! Runtime adapters for running operations on an existing executor.

#[cfg(feature = "tokio-runtime")]
pub mod tokio_dispatcher;

#[cfg(feature = "tokio-runtime")]
pub use tokio_dispatcher::TokioDispatcher;
