//! Configuration models for the operation registry.

pub mod registry;

pub use registry::{RegistryConfig, EVICT_FINISHED_ENV, MAX_TRACKED_ENV};
