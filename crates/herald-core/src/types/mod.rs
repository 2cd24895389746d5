//! Shared value types: typed identifiers and pagination.

pub mod id;
pub mod pagination;
