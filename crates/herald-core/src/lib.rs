//! # herald-core
//!
//! Core crate for Herald, the notification distribution engine. Contains
//! configuration schemas, typed identifiers, pagination types, the cache
//! provider trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Herald crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
