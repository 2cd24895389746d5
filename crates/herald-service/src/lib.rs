//! # herald-service
//!
//! Business logic for Herald. [`engine::NotificationEngine`] is the single
//! entry point collaborators call; it composes targeting resolution,
//! fan-out, read-state synchronization, and unread-count aggregation, and
//! emits best-effort push events through the [`push::PushSink`] seam.

pub mod aggregator;
pub mod engine;
pub mod fanout;
pub mod push;
pub mod read_state;
pub mod request;
pub mod targeting;

pub use engine::NotificationEngine;
pub use push::{PushEvent, PushSink, StateChange};
pub use request::CreateNotification;
