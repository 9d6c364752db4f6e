// mysite/src/services/cache.rs

//! Process-wide keyed snapshot cache with per-entry expiry.
//!
//! Values are stored as JSON. There is no eviction beyond expiry and no
//! invalidation: writers overwrite, readers see stale data until the TTL
//! runs out.

use crate::errors::{AppError, Result};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Default)]
pub struct SnapshotCache {
  entries: Mutex<HashMap<String, (Value, Instant)>>,
}

impl SnapshotCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Stores `value` under `key` for `expire_secs` seconds, replacing any
  /// earlier entry.
  pub fn set<V: Serialize>(&self, key: &str, value: V, expire_secs: u64) -> Result<()> {
    let json = serde_json::to_value(&value)
      .map_err(|e| AppError::Internal(format!("Cache value for '{}' is not serializable: {}", key, e)))?;
    let expires_at = Instant::now() + Duration::from_secs(expire_secs);
    self.entries.lock().insert(key.to_string(), (json, expires_at));
    trace!(key, expire_secs, "Cache entry stored.");
    Ok(())
  }

  /// Returns the live entry for `key`. Expired entries are dropped; a stored
  /// `null` reads the same as a missing entry.
  pub fn get<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
    let value = {
      let mut entries = self.entries.lock();
      match entries.get(key) {
        Some((_, expires_at)) if *expires_at <= Instant::now() => {
          entries.remove(key);
          None
        }
        Some((value, _)) => Some(value.clone()),
        None => None,
      }
    };
    match value {
      Some(Value::Null) | None => {
        trace!(key, "Cache miss.");
        None
      }
      Some(json) => serde_json::from_value(json).ok(),
    }
  }
}
