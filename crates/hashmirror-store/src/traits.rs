use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::StoreResult;

/// Hash-structured key/value store.
///
/// All implementations must satisfy these invariants:
/// - A hash is addressed by name; its fields map to plain string values.
///   The store never interprets field contents.
/// - Operations are individually atomic; no cross-field or cross-hash
///   atomicity is offered or assumed.
/// - A missing hash behaves like an empty one: `read_all` returns an empty
///   map, `read_field` returns `None`.
/// - All failures are propagated as errors, never silently ignored, and a
///   failed write leaves the hash unchanged.
#[async_trait]
pub trait HashStore: Send + Sync {
    /// Read every field of the named hash.
    async fn read_all(&self, hash: &str) -> StoreResult<HashMap<String, String>>;

    /// Read a single field. Returns `Ok(None)` if the field does not exist.
    async fn read_field(&self, hash: &str, field: &str) -> StoreResult<Option<String>>;

    /// Write a single field, creating the hash if needed.
    async fn write_field(&self, hash: &str, field: &str, value: &str) -> StoreResult<()>;

    /// Delete a single field. Returns `true` if the field existed.
    async fn delete_field(&self, hash: &str, field: &str) -> StoreResult<bool>;

    /// Delete the entire hash. Returns `true` if the hash existed.
    async fn delete_hash(&self, hash: &str) -> StoreResult<bool>;
}
