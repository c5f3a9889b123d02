//! Resilience primitives.

pub mod backoff;

pub use backoff::calculate_backoff;
