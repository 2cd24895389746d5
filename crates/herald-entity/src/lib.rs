//! # herald-entity
//!
//! Domain entity models for Herald. Every struct in this crate represents
//! a database table row or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`; database entities
//! additionally implement `sqlx::FromRow`.

pub mod notification;
pub mod recipient;
