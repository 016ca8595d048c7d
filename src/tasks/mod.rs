//! Background Tasks Module
//!
//! Periodic work that runs for the lifetime of the process.
//!
//! # Tasks
//! - Perf trim: drops performance records older than the retention window

mod trim;

pub use trim::spawn_trim_task;
