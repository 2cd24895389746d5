//! # herald-worker
//!
//! Scheduled maintenance for Herald. The only recurring task is the
//! purge sweep that physically deletes notifications past their logical
//! TTL; expiry itself is enforced by query predicates, so the sweep only
//! reclaims storage and can run at any cadence.

pub mod scheduler;

pub use scheduler::PurgeScheduler;
