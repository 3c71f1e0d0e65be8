//! chemdrill-store — tiered TTL cache and score-history persistence.
//!
//! Both stores degrade rather than fail: a rejected durable write leaves
//! the cache memory-only and a history write a no-op, because losing
//! storage must never abort a quiz session.

pub mod cache;
pub mod durable;
pub mod error;
pub mod history;

pub use cache::{CacheStore, Clock, ManualClock, SystemClock};
pub use durable::{DurableStore, JsonFileStore, MemoryStore};
pub use error::StoreError;
pub use history::{HistoryStore, HISTORY_CAP};
