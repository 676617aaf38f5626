//! Placement test engine: question bank loading, adaptive selection,
//! resumable sessions, scoring and study-plan generation.
//!
//! The `leveltest` binary drives this library from a terminal UI; integration
//! tests and benchmarks use it directly.

pub mod bank;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod placement;
pub mod session;
pub mod store;
pub mod ui;
