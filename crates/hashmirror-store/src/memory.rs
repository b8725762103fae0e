use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::traits::HashStore;

/// In-memory, HashMap-based hash store.
///
/// Intended for tests and embedding. All hashes are held in memory behind a
/// `RwLock` for safe concurrent access. Multiple mirrors may share one
/// instance, which makes it a faithful stand-in for a shared remote store
/// within a single process.
pub struct InMemoryHashStore {
    hashes: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl InMemoryHashStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            hashes: RwLock::new(HashMap::new()),
        }
    }

    /// Number of hashes currently stored.
    pub fn len(&self) -> usize {
        self.hashes.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store holds no hashes.
    pub fn is_empty(&self) -> bool {
        self.hashes.read().expect("lock poisoned").is_empty()
    }

    /// Number of fields in the named hash, zero if it does not exist.
    pub fn field_count(&self, hash: &str) -> usize {
        self.hashes
            .read()
            .expect("lock poisoned")
            .get(hash)
            .map_or(0, HashMap::len)
    }
}

impl Default for InMemoryHashStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HashStore for InMemoryHashStore {
    async fn read_all(&self, hash: &str) -> StoreResult<HashMap<String, String>> {
        let map = self.hashes.read().expect("lock poisoned");
        Ok(map.get(hash).cloned().unwrap_or_default())
    }

    async fn read_field(&self, hash: &str, field: &str) -> StoreResult<Option<String>> {
        let map = self.hashes.read().expect("lock poisoned");
        Ok(map.get(hash).and_then(|h| h.get(field).cloned()))
    }

    async fn write_field(&self, hash: &str, field: &str, value: &str) -> StoreResult<()> {
        let mut map = self.hashes.write().expect("lock poisoned");
        map.entry(hash.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_field(&self, hash: &str, field: &str) -> StoreResult<bool> {
        let mut map = self.hashes.write().expect("lock poisoned");
        let Some(fields) = map.get_mut(hash) else {
            return Ok(false);
        };
        let existed = fields.remove(field).is_some();
        // An emptied hash disappears, matching "missing behaves like empty".
        if fields.is_empty() {
            map.remove(hash);
        }
        Ok(existed)
    }

    async fn delete_hash(&self, hash: &str) -> StoreResult<bool> {
        let mut map = self.hashes.write().expect("lock poisoned");
        Ok(map.remove(hash).is_some())
    }
}

impl std::fmt::Debug for InMemoryHashStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryHashStore")
            .field("hash_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Core field operations
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn write_and_read_field() {
        let store = InMemoryHashStore::new();
        store.write_field("users", "alice", "admin").await.unwrap();

        let value = store.read_field("users", "alice").await.unwrap();
        assert_eq!(value.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn overwrite_replaces_value() {
        let store = InMemoryHashStore::new();
        store.write_field("h", "k", "v1").await.unwrap();
        store.write_field("h", "k", "v2").await.unwrap();

        let value = store.read_field("h", "k").await.unwrap();
        assert_eq!(value.as_deref(), Some("v2"));
        assert_eq!(store.field_count("h"), 1);
    }

    #[tokio::test]
    async fn read_missing_field_returns_none() {
        let store = InMemoryHashStore::new();
        store.write_field("h", "present", "v").await.unwrap();
        assert!(store.read_field("h", "absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_hash_behaves_like_empty() {
        let store = InMemoryHashStore::new();
        assert!(store.read_all("ghost").await.unwrap().is_empty());
        assert!(store.read_field("ghost", "k").await.unwrap().is_none());
        assert!(!store.delete_field("ghost", "k").await.unwrap());
        assert!(!store.delete_hash("ghost").await.unwrap());
    }

    // -----------------------------------------------------------------------
    // Bulk read
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn read_all_returns_every_field() {
        let store = InMemoryHashStore::new();
        store.write_field("h", "a", "1").await.unwrap();
        store.write_field("h", "b", "2").await.unwrap();
        store.write_field("other", "c", "3").await.unwrap();

        let all = store.read_all("h").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["a"], "1");
        assert_eq!(all["b"], "2");
    }

    // -----------------------------------------------------------------------
    // Deletion
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn delete_field_reports_existence() {
        let store = InMemoryHashStore::new();
        store.write_field("h", "k", "v").await.unwrap();

        assert!(store.delete_field("h", "k").await.unwrap());
        assert!(!store.delete_field("h", "k").await.unwrap());
        assert!(store.read_field("h", "k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_last_field_removes_hash() {
        let store = InMemoryHashStore::new();
        store.write_field("h", "k", "v").await.unwrap();
        store.delete_field("h", "k").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delete_hash_removes_all_fields() {
        let store = InMemoryHashStore::new();
        store.write_field("h", "a", "1").await.unwrap();
        store.write_field("h", "b", "2").await.unwrap();

        assert!(store.delete_hash("h").await.unwrap());
        assert!(store.read_all("h").await.unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Shared access
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn concurrent_writers_are_safe() {
        use std::sync::Arc;

        let store = Arc::new(InMemoryHashStore::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .write_field("shared", &format!("k{i}"), "v")
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.field_count("shared"), 8);
    }

    #[tokio::test]
    async fn debug_format() {
        let store = InMemoryHashStore::new();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryHashStore"));
        assert!(debug.contains("hash_count"));
    }
}
