use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one mirror instance within one process.
///
/// Minted at mirror construction and attached to every outbound broadcast
/// event so the instance can discard its own events on receipt. Never
/// persisted and never compared across restarts — two mirrors of the same
/// hash in the same process get distinct identities.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(uuid::Uuid);

impl InstanceId {
    /// Mint a new time-ordered instance identity (UUID v7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Short identifier (first 8 hex characters), for log output.
    pub fn short_id(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", self.short_id())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_ids_are_unique() {
        let id1 = InstanceId::new();
        let id2 = InstanceId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn short_id_format() {
        let id = InstanceId::new();
        assert_eq!(id.short_id().len(), 8);
    }

    #[test]
    fn serde_roundtrip() {
        let id = InstanceId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: InstanceId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn from_uuid_preserves_identity() {
        let raw = uuid::Uuid::now_v7();
        let id1 = InstanceId::from_uuid(raw);
        let id2 = InstanceId::from_uuid(raw);
        assert_eq!(id1, id2);
    }
}
