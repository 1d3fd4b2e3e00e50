//! Background Tasks Module
//!
//! Contains background workers that run alongside foreground cache
//! traffic.
//!
//! # Tasks
//! - Periodic trim: applies the memory tier's cost/count/age limits at
//!   the configured interval
//!
//! The disk tier's trash reclamation worker lives with the storage engine
//! itself, since it must run without an async runtime.

mod trim;

pub use trim::spawn_trim_task;
