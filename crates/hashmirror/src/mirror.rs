use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use hashmirror_bus::PubSubBus;
use hashmirror_store::HashStore;
use hashmirror_types::{BroadcastEvent, InstanceId, MutationKind, Value};

use crate::channel::ReplicationChannel;
use crate::config::MirrorConfig;
use crate::error::MirrorResult;
use crate::observe::{ChangeFilter, ChangeRouter, ChangeStream, MirrorChange};

/// State shared between a [`Mirror`] and its replication channel's receive
/// task. The cache is mutated only by the mirror's own operations and by
/// the receive task applying remote events.
pub(crate) struct MirrorShared {
    name: String,
    channel_name: String,
    instance: InstanceId,
    cache: RwLock<HashMap<String, Value>>,
    store: Arc<dyn HashStore>,
    bus: Arc<dyn PubSubBus>,
    router: ChangeRouter,
    config: MirrorConfig,
}

impl MirrorShared {
    fn cached(&self, key: &str) -> Option<Value> {
        self.cache.read().expect("cache lock poisoned").get(key).cloned()
    }

    fn insert(&self, key: String, value: Value) {
        self.cache
            .write()
            .expect("cache lock poisoned")
            .insert(key, value);
    }

    /// Shallow copy of the cache for snapshot iteration.
    fn snapshot(&self) -> Vec<(String, Value)> {
        self.cache
            .read()
            .expect("cache lock poisoned")
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Serialize and publish an event on the replication channel.
    ///
    /// Publish failures are logged, not returned: the store write that
    /// preceded this call already succeeded and is the authoritative
    /// outcome.
    async fn broadcast(&self, event: BroadcastEvent) {
        let payload = match event.to_json() {
            Ok(p) => p,
            Err(e) => {
                warn!(channel = %self.channel_name, error = %e, "failed to serialize broadcast event");
                return;
            }
        };
        if let Err(e) = self.bus.publish(&self.channel_name, &payload).await {
            warn!(channel = %self.channel_name, error = %e, "broadcast publish failed");
        }
    }

    /// Handle one raw message from the replication channel.
    ///
    /// Malformed messages are dropped with a warning; a single corrupt
    /// broadcast must not crash or desynchronize the mirror. Events this
    /// instance sent itself are discarded silently.
    pub(crate) fn apply_raw(&self, raw: &str) {
        let event = match BroadcastEvent::from_json(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(name = %self.name, error = %e, "dropping malformed broadcast");
                return;
            }
        };
        // Self-origin filter: this instance already applied the mutation
        // when it wrote the store, and a stale re-apply could overwrite a
        // newer local value.
        if event.sender == self.instance {
            return;
        }
        self.apply_remote(event);
    }

    /// Apply a remote mutation to the cache, then notify observers.
    fn apply_remote(&self, event: BroadcastEvent) {
        let change = match event.kind {
            MutationKind::Add => {
                let (Some(key), Some(raw_val)) = (event.key, event.val) else {
                    warn!(name = %self.name, "dropping add event without key/val");
                    return;
                };
                let value = match Value::decode(&raw_val) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(name = %self.name, key = %key, error = %e, "dropping undecodable broadcast value");
                        return;
                    }
                };
                self.insert(key.clone(), value.clone());
                MirrorChange::Added { key, value }
            }
            MutationKind::Remove => {
                let Some(key) = event.key else {
                    warn!(name = %self.name, "dropping remove event without key");
                    return;
                };
                self.cache.write().expect("cache lock poisoned").remove(&key);
                MirrorChange::Removed { key }
            }
            MutationKind::Reset => {
                self.cache.write().expect("cache lock poisoned").clear();
                MirrorChange::Cleared
            }
        };
        debug!(name = %self.name, kind = %change.kind(), key = change.key().unwrap_or("-"), "applied remote mutation");
        self.router.route(&change);
    }
}

/// Process-local mirror of a remote named hash.
///
/// Reads are served from the local cache with read-through population on a
/// miss. Writes go to the store first; only after confirmed durability is
/// the cache updated and the mutation broadcast to other mirrors of the
/// same hash. Remote mutations arrive on the replication channel and are
/// applied directly to the cache — the originating instance already wrote
/// the store.
pub struct Mirror {
    shared: Arc<MirrorShared>,
    channel: ReplicationChannel,
}

impl Mirror {
    /// Create a mirror of the named hash.
    ///
    /// Bulk-reads every field of the hash, decodes each through the
    /// envelope, and populates the cache; then subscribes to the
    /// replication channel derived from the hash name and starts the
    /// receive task. Returning `Ok` is the readiness signal.
    ///
    /// A store read, envelope decode, or subscribe failure fails the whole
    /// call and nothing is left running; the cache is never partially
    /// populated. Events published by other instances between the bulk
    /// read and the subscription are missed — staleness from that window
    /// resolves through their next mutation.
    pub async fn init(
        store: Arc<dyn HashStore>,
        bus: Arc<dyn PubSubBus>,
        name: impl Into<String>,
        config: MirrorConfig,
    ) -> MirrorResult<Self> {
        let name = name.into();
        let instance = InstanceId::new();

        let raw_fields = store.read_all(&name).await?;
        let mut cache = HashMap::with_capacity(raw_fields.len());
        for (field, payload) in raw_fields {
            cache.insert(field, Value::decode(&payload)?);
        }

        let channel_name = config.channel_for(&name);
        let subscription = bus.subscribe(&channel_name).await?;

        let shared = Arc::new(MirrorShared {
            name,
            channel_name,
            instance,
            cache: RwLock::new(cache),
            store,
            bus,
            router: ChangeRouter::new(),
            config,
        });
        let channel = ReplicationChannel::spawn(Arc::clone(&shared), subscription);

        info!(
            name = %shared.name,
            instance = %shared.instance.short_id(),
            entries = shared.cache.read().expect("cache lock poisoned").len(),
            "mirror ready"
        );
        Ok(Self { shared, channel })
    }

    /// Read a field.
    ///
    /// A cache hit returns immediately with no store access. On a miss the
    /// field is read through from the store, decoded, and cached. A store
    /// miss returns `Ok(None)` and is not cached, so a later write by any
    /// instance is observed normally.
    pub async fn get(&self, key: &str) -> MirrorResult<Option<Value>> {
        if let Some(value) = self.shared.cached(key) {
            return Ok(Some(value));
        }
        let Some(raw) = self.shared.store.read_field(&self.shared.name, key).await? else {
            return Ok(None);
        };
        let value = Value::decode(&raw)?;
        self.shared.insert(key.to_string(), value.clone());
        Ok(Some(value))
    }

    /// Write a field.
    ///
    /// The encoded value goes to the store first; only on success is the
    /// decoded value cached and an `add` event broadcast. On failure the
    /// cache is untouched and nothing is published, so the local view stays
    /// consistent with "the write did not happen".
    pub async fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> MirrorResult<()> {
        let key = key.into();
        let value = value.into();
        let encoded = value.encode()?;

        self.shared
            .store
            .write_field(&self.shared.name, &key, &encoded)
            .await?;

        self.shared.insert(key.clone(), value);
        debug!(name = %self.shared.name, key = %key, "field written");
        self.shared
            .broadcast(BroadcastEvent::add(self.shared.instance, key, encoded))
            .await;
        Ok(())
    }

    /// Delete a field. Returns whether the store had it.
    ///
    /// Same ordering contract as [`set`](Self::set): the store delete must
    /// succeed before the cache entry is removed and a `remove` event is
    /// broadcast.
    pub async fn remove(&self, key: &str) -> MirrorResult<bool> {
        let existed = self
            .shared
            .store
            .delete_field(&self.shared.name, key)
            .await?;

        self.shared.cache.write().expect("cache lock poisoned").remove(key);
        debug!(name = %self.shared.name, key = %key, "field removed");
        self.shared
            .broadcast(BroadcastEvent::remove(self.shared.instance, key))
            .await;
        Ok(existed)
    }

    /// Visit every cached entry over a point-in-time snapshot.
    ///
    /// The snapshot is taken before iteration begins, so mutations made by
    /// the visitor or applied concurrently never affect which entries are
    /// visited. No ordering guarantee across entries.
    pub fn each(&self, mut visitor: impl FnMut(&str, &Value)) {
        for (key, value) in self.shared.snapshot() {
            visitor(&key, &value);
        }
    }

    /// Like [`each`](Self::each), but stops at the first visitor returning
    /// `true`. Returns whether any visitor did.
    pub fn some(&self, mut visitor: impl FnMut(&str, &Value) -> bool) -> bool {
        for (key, value) in self.shared.snapshot() {
            if visitor(&key, &value) {
                return true;
            }
        }
        false
    }

    /// Returns `true` iff the key is present in the cache. Does not consult
    /// the store.
    pub fn exists(&self, key: &str) -> bool {
        self.shared
            .cache
            .read()
            .expect("cache lock poisoned")
            .contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.shared.cache.read().expect("cache lock poisoned").len()
    }

    /// Returns `true` if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the mirrored hash.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// This mirror's instance identity.
    pub fn instance(&self) -> InstanceId {
        self.shared.instance
    }

    /// Clear the hash everywhere.
    ///
    /// Deletes the entire hash in the store; only on confirmed success is
    /// the cache cleared and a `reset` event broadcast. A failed store
    /// delete leaves local state untouched and the error propagates.
    pub async fn reset(&self) -> MirrorResult<()> {
        self.shared.store.delete_hash(&self.shared.name).await?;
        self.shared.cache.write().expect("cache lock poisoned").clear();
        debug!(name = %self.shared.name, "hash reset");
        self.shared
            .broadcast(BroadcastEvent::reset(self.shared.instance))
            .await;
        Ok(())
    }

    /// Register an observer for remote changes matching the filter.
    ///
    /// Changes are delivered after the cache mutation, in apply order.
    /// Local mutations through this mirror do not notify.
    pub fn observe(&self, filter: ChangeFilter) -> ChangeStream {
        self.shared
            .router
            .subscribe(filter, self.shared.config.observer_capacity)
    }

    /// Tear the mirror down, consuming it.
    ///
    /// Stops the receive task, unsubscribes from the replication channel,
    /// and deletes the backing hash in the store — this mirror's notion of
    /// the hash ceases to exist there. Consuming `self` makes a second
    /// cleanup unrepresentable.
    pub async fn cleanup(self) -> MirrorResult<()> {
        self.channel.teardown().await;
        self.shared.bus.unsubscribe(&self.shared.channel_name).await?;
        self.shared.store.delete_hash(&self.shared.name).await?;
        info!(name = %self.shared.name, instance = %self.shared.instance.short_id(), "mirror cleaned up");
        Ok(())
    }
}

impl std::fmt::Debug for Mirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mirror")
            .field("name", &self.shared.name)
            .field("instance", &self.shared.instance)
            .field("entries", &self.len())
            .finish()
    }
}
