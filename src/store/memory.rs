use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::KeyValueStore;

/// In-memory store for tests and credential-less development. Honors the
/// same contract as `RedisStore`, including lazy TTL expiry: an expired
/// entry is treated as absent at read time.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    values: HashMap<String, Entry>,
    sets: HashMap<String, HashSet<String>>,
}

struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(at) if at <= Instant::now())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set_json(&self, key: &str, value: &Value, ttl_secs: Option<u64>) -> bool {
        let mut inner = self.inner.write().await;
        inner.values.insert(
            key.to_string(),
            Entry {
                value: value.clone(),
                expires_at: ttl_secs.map(|ttl| Instant::now() + Duration::from_secs(ttl)),
            },
        );
        true
    }

    async fn get_json(&self, key: &str) -> Option<Value> {
        let inner = self.inner.read().await;
        inner
            .values
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    async fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.write().await;
        let had_value = inner.values.remove(key).is_some();
        let had_set = inner.sets.remove(key).is_some();
        had_value || had_set
    }

    async fn exists(&self, key: &str) -> bool {
        let inner = self.inner.read().await;
        inner.values.get(key).is_some_and(|e| !e.is_expired()) || inner.sets.contains_key(key)
    }

    async fn keys(&self, pattern: &str) -> Vec<String> {
        let inner = self.inner.read().await;
        let mut matched: Vec<String> = inner
            .values
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(k, _)| k.clone())
            .chain(inner.sets.keys().cloned())
            .filter(|k| glob_match(pattern, k))
            .collect();
        matched.sort();
        matched.dedup();
        matched
    }

    async fn add_to_set(&self, key: &str, values: &[String]) -> usize {
        let mut inner = self.inner.write().await;
        let set = inner.sets.entry(key.to_string()).or_default();
        values.iter().filter(|v| set.insert((*v).clone())).count()
    }

    async fn get_set_members(&self, key: &str) -> HashSet<String> {
        let inner = self.inner.read().await;
        inner.sets.get(key).cloned().unwrap_or_default()
    }

    async fn remove_from_set(&self, key: &str, values: &[String]) -> usize {
        let mut inner = self.inner.write().await;
        match inner.sets.get_mut(key) {
            Some(set) => values.iter().filter(|v| set.remove(*v)).count(),
            None => 0,
        }
    }
}

/// Glob match supporting `*` (any run) and `?` (any single char), the subset
/// of Redis KEYS patterns the registry uses.
fn glob_match(pattern: &str, text: &str) -> bool {
    fn matches(p: &[u8], t: &[u8]) -> bool {
        match (p.first(), t.first()) {
            (None, None) => true,
            (Some(b'*'), _) => {
                matches(&p[1..], t) || (!t.is_empty() && matches(p, &t[1..]))
            }
            (Some(b'?'), Some(_)) => matches(&p[1..], &t[1..]),
            (Some(pc), Some(tc)) if pc == tc => matches(&p[1..], &t[1..]),
            _ => false,
        }
    }
    matches(pattern.as_bytes(), text.as_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("position:*", "position:abc"));
        assert!(glob_match("position:user:*", "position:user:discord:u1"));
        assert!(!glob_match("position:user:*", "position:abc"));
        assert!(glob_match("p?s", "pos"));
        assert!(!glob_match("p?s", "poss"));
        assert!(glob_match("*", ""));
        assert!(!glob_match("", "x"));
    }

    #[tokio::test]
    async fn test_set_get_delete_roundtrip() {
        let store = MemoryStore::new();
        let value = json!({"a": 1});

        assert!(store.set_json("k1", &value, None).await);
        assert_eq!(store.get_json("k1").await, Some(value));
        assert!(store.exists("k1").await);

        assert!(store.delete("k1").await);
        assert_eq!(store.get_json("k1").await, None);
        assert!(!store.delete("k1").await);
    }

    #[tokio::test]
    async fn test_ttl_expires_lazily() {
        let store = MemoryStore::new();
        assert!(store.set_json("gone", &json!(1), Some(0)).await);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(store.get_json("gone").await, None);
        assert!(!store.exists("gone").await);
    }

    #[tokio::test]
    async fn test_set_operations() {
        let store = MemoryStore::new();
        let ids = vec!["a".to_string(), "b".to_string()];

        assert_eq!(store.add_to_set("s", &ids).await, 2);
        assert_eq!(store.add_to_set("s", &ids).await, 0);
        assert_eq!(store.get_set_members("s").await.len(), 2);

        assert_eq!(store.remove_from_set("s", &["a".to_string()]).await, 1);
        assert_eq!(store.remove_from_set("s", &["a".to_string()]).await, 0);
        assert_eq!(store.get_set_members("s").await.len(), 1);
    }

    #[tokio::test]
    async fn test_keys_pattern_is_sorted() {
        let store = MemoryStore::new();
        store.set_json("position:b", &json!(1), None).await;
        store.set_json("position:a", &json!(1), None).await;
        store.set_json("other:c", &json!(1), None).await;
        store.add_to_set("position:user:discord:u1", &["x".to_string()]).await;

        let keys = store.keys("position:*").await;
        assert_eq!(
            keys,
            vec!["position:a", "position:b", "position:user:discord:u1"]
        );
    }
}
