//! Local response cache for offline access.
//!
//! This module provides `CacheStorage` for managing the named cache
//! generations on disk, and `Cache`, the handle to one generation with
//! exact-request match/put semantics.
//!
//! On disk an entry is a pair of files named by the SHA-256 of the request
//! key: JSON metadata plus a raw body blob. Superseded generations are
//! deleted wholesale at activation, never merged.

pub mod entry;
pub mod storage;

pub use entry::CachedEntry;
pub use storage::{Cache, CacheStorage};
