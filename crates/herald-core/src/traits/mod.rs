//! Cross-crate trait seams.

pub mod cache;
pub mod identity;
pub mod roster;
