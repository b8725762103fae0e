use std::sync::RwLock;

use tokio::sync::broadcast;

use hashmirror_types::{MutationKind, Value};

/// A change applied to the local cache by a remote mirror instance.
///
/// Delivered to observers after the cache mutation, in apply order. Local
/// mutations do not produce changes — observers exist to react to what
/// other instances did (e.g. invalidate a derived cache).
#[derive(Clone, Debug, PartialEq)]
pub enum MirrorChange {
    /// A field was written by a remote instance.
    Added { key: String, value: Value },
    /// A field was deleted by a remote instance.
    Removed { key: String },
    /// The whole hash was cleared by a remote instance.
    Cleared,
}

impl MirrorChange {
    /// The mutation kind this change corresponds to.
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Added { .. } => MutationKind::Add,
            Self::Removed { .. } => MutationKind::Remove,
            Self::Cleared => MutationKind::Reset,
        }
    }

    /// The affected key, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Added { key, .. } | Self::Removed { key } => Some(key),
            Self::Cleared => None,
        }
    }
}

/// Filter for subscribing to a subset of remote changes.
#[derive(Clone, Debug, Default)]
pub struct ChangeFilter {
    /// If set, only changes of these kinds are delivered.
    pub kinds: Option<Vec<MutationKind>>,
    /// If set, only changes touching these keys are delivered. Keyless
    /// changes (`Cleared`) always pass this clause.
    pub keys: Option<Vec<String>>,
}

impl ChangeFilter {
    /// Returns `true` if the given change matches this filter.
    pub fn matches(&self, change: &MirrorChange) -> bool {
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&change.kind()) {
                return false;
            }
        }
        if let Some(ref keys) = self.keys {
            if let Some(key) = change.key() {
                if !keys.iter().any(|k| k == key) {
                    return false;
                }
            }
        }
        true
    }
}

/// A broadcast channel receiver for remote changes.
pub type ChangeStream = broadcast::Receiver<MirrorChange>;

/// Internal subscriber: a filter paired with a broadcast sender.
struct Observer {
    filter: ChangeFilter,
    sender: broadcast::Sender<MirrorChange>,
}

/// Fan-out registry that delivers remote changes to matching observers.
pub(crate) struct ChangeRouter {
    observers: RwLock<Vec<Observer>>,
}

impl ChangeRouter {
    pub(crate) fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register a new observer with the given filter.
    /// Returns a broadcast receiver for the matching changes.
    pub(crate) fn subscribe(&self, filter: ChangeFilter, capacity: usize) -> ChangeStream {
        let (tx, rx) = broadcast::channel(capacity);
        let observer = Observer { filter, sender: tx };
        self.observers
            .write()
            .expect("router lock poisoned")
            .push(observer);
        rx
    }

    /// Route a change to all matching observers.
    /// Observers whose channels are closed are pruned.
    pub(crate) fn route(&self, change: &MirrorChange) {
        let mut observers = self.observers.write().expect("router lock poisoned");
        observers.retain(|obs| {
            if obs.filter.matches(change) {
                // If send fails (no receivers), the observer is stale.
                obs.sender.send(change.clone()).is_ok()
            } else {
                // Keep non-matching observers; they may match future
                // changes. Only prune if the channel itself is closed.
                obs.sender.receiver_count() > 0
            }
        });
    }

    /// Number of registered observers.
    pub(crate) fn observer_count(&self) -> usize {
        self.observers.read().expect("router lock poisoned").len()
    }
}
