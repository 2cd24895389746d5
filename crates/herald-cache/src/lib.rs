//! # herald-cache
//!
//! Cache provider implementations for Herald. Two modes:
//!
//! - **memory**: In-process cache using [moka](https://crates.io/crates/moka)
//! - **noop**: Caching disabled; every read is a cold computation
//!
//! The provider is selected at runtime based on configuration. Only
//! aggregate unread counts are cached; listings and single-item reads
//! always go to the store.

pub mod keys;
pub mod memory;
pub mod noop;
pub mod provider;

pub use memory::MemoryCacheProvider;
pub use noop::NoopCacheProvider;
pub use provider::from_config;
