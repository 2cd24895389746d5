//! PostgreSQL implementation of the notification store.

pub mod store;

pub use store::PgNotificationStore;
