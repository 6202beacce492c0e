//! Cache system for Redis-based hash-field storage
//!
//! This crate provides the storage backend seam used by GeoHaus: the
//! [`HashStore`] trait, a Redis implementation ([`CacheManager`]), an
//! in-process implementation ([`MemoryHashStore`]) and JSON-typed
//! accessors ([`JsonFields`]) layered over any of them.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod errors;
pub mod fields;
pub mod manager;
pub mod memory;
pub mod prelude;
pub mod store;

// Re-export centralized config
pub use config::CacheConfig;

pub use errors::CacheError;
pub use fields::JsonFields;
pub use manager::CacheManager;
pub use memory::MemoryHashStore;
pub use store::HashStore;
