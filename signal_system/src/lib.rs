//! Signal system for cache change notifications
//!
//! This crate lets embedders subscribe to insert, update, append and delete
//! events emitted by the GeoHaus feature cache.

pub mod event;
pub mod manager;
pub mod prelude;

pub use event::{CacheEvent, EventType};
pub use manager::{EventCallback, SignalManager, SignalStats};
