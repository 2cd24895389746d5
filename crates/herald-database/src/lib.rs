//! # herald-database
//!
//! Storage layer for Herald. Defines the [`store::NotificationStore`]
//! contract (conditional-OR flag updates, insert-if-absent fan-out
//! batches, joined visibility queries) and ships two implementations:
//! [`postgres::PgNotificationStore`] for production and
//! [`memory::MemoryNotificationStore`] for tests and embedded use.
//! Also provides PostgreSQL-backed adapters for the roster and identity
//! collaborator seams.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod roster;
pub mod store;

pub use store::NotificationStore;
