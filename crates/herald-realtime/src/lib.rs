//! # herald-realtime
//!
//! Live push delivery for Herald. A [`connection::ConnectionPool`] tracks
//! every open client connection indexed by recipient, and the
//! [`notifier::Notifier`] implements the engine's push seam by serializing
//! each event once and offering it to all of the recipient's connections.
//!
//! Delivery is strictly best-effort: full buffers and closed connections
//! drop the frame with a log line, never an error. Clients reconcile by
//! querying.

pub mod connection;
pub mod notifier;

pub use connection::{ConnectionHandle, ConnectionPool};
pub use notifier::Notifier;
