//! `fieldbill-observability` — logging/tracing setup for process entry points.

pub mod tracing;

pub use crate::tracing::init;
