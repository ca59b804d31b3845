pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use self::redis::RedisStore;

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::Value;

/// Key/value operations the position registry needs: JSON records,
/// per-key TTLs, glob key listing, and string sets.
///
/// Every operation is a self-contained round trip, atomic at the single-key
/// level; no connection is held across calls. Backend failures are logged
/// inside the implementation and converted to sentinel results (`false`,
/// `None`, empty, `0`) so a storage outage never crashes a chat bot turn.
/// The flip side is that callers cannot tell "missing" from "backend down".
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Write a JSON value, optionally with a TTL in seconds. Returns false
    /// on any backend failure.
    async fn set_json(&self, key: &str, value: &Value, ttl_secs: Option<u64>) -> bool;

    /// Read a JSON value; `None` when absent, expired, or on failure.
    async fn get_json(&self, key: &str) -> Option<Value>;

    /// Delete a key. Returns true when a key was actually removed.
    async fn delete(&self, key: &str) -> bool;

    async fn exists(&self, key: &str) -> bool;

    /// Keys matching a glob-style pattern (`*` and `?`).
    async fn keys(&self, pattern: &str) -> Vec<String>;

    /// Add members to a string set; returns how many were newly added.
    async fn add_to_set(&self, key: &str, values: &[String]) -> usize;

    async fn get_set_members(&self, key: &str) -> HashSet<String>;

    /// Remove members from a string set; returns how many were removed.
    async fn remove_from_set(&self, key: &str, values: &[String]) -> usize;
}
