//! Two-tier TTL cache.
//!
//! The memory tier is consulted first, then the durable tier; a durable
//! hit backfills memory. Freshness is checked on every read, so a miss
//! never yields a stale value; expired entries are evicted lazily from the
//! tier they were found in. Writes never fail the caller: a rejected
//! durable write leaves the memory tier updated and is logged.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::durable::DurableStore;

/// Millisecond clock, injectable so TTL expiry is testable without
/// sleeping.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock for tests.
#[derive(Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(start_ms),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms.fetch_add(by.as_millis() as i64, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::Relaxed)
    }
}

/// A cached value with its storage timestamp. Owned exclusively by the
/// cache; this shape is also the durable-tier JSON layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry<T> {
    value: T,
    stored_at: i64,
}

/// Two-tier cache for one data class, with a fixed TTL.
///
/// Constructed explicitly and passed to whatever needs it; one instance
/// per data class (e.g. hour-long TTL for question pools, seconds for
/// fast-changing aggregates).
pub struct CacheStore {
    memory: Mutex<HashMap<String, CacheEntry<serde_json::Value>>>,
    durable: Arc<dyn DurableStore>,
    ttl_ms: i64,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    pub fn new(durable: Arc<dyn DurableStore>, ttl: Duration) -> Self {
        Self::with_clock(durable, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(durable: Arc<dyn DurableStore>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            memory: Mutex::new(HashMap::new()),
            durable,
            ttl_ms: ttl.as_millis() as i64,
            clock,
        }
    }

    fn is_fresh(&self, stored_at: i64) -> bool {
        self.clock.now_ms() - stored_at < self.ttl_ms
    }

    /// Look up a fresh value, consulting memory then the durable tier.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        {
            let mut memory = self.memory.lock().unwrap();
            if let Some(entry) = memory.get(key) {
                if self.is_fresh(entry.stored_at) {
                    match serde_json::from_value(entry.value.clone()) {
                        Ok(value) => return Some(value),
                        Err(e) => {
                            tracing::warn!(key, error = %e, "cached value has wrong shape, evicting");
                            memory.remove(key);
                            self.durable.remove(key);
                            return None;
                        }
                    }
                }
                memory.remove(key);
            }
        }

        let raw = self.durable.get(key)?;
        let entry: CacheEntry<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key, error = %e, "durable cache entry is corrupt, evicting");
                self.durable.remove(key);
                return None;
            }
        };

        if !self.is_fresh(entry.stored_at) {
            self.durable.remove(key);
            return None;
        }

        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => {
                // Backfill the cheap tier.
                self.memory.lock().unwrap().insert(key.to_string(), entry);
                Some(value)
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "durable cache value has wrong shape, evicting");
                self.durable.remove(key);
                None
            }
        }
    }

    /// Store a value in both tiers. Never fails: a rejected durable write
    /// degrades to memory-only caching.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "value is not serializable, not caching");
                return;
            }
        };

        let entry = CacheEntry {
            value,
            stored_at: self.clock.now_ms(),
        };

        match serde_json::to_string(&entry) {
            Ok(json) => {
                if let Err(e) = self.durable.set(key, &json) {
                    tracing::warn!(key, error = %e, "durable cache write failed, memory tier only");
                }
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "cache entry serialization failed");
            }
        }

        self.memory.lock().unwrap().insert(key.to_string(), entry);
    }
}
