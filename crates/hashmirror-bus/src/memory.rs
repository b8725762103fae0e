use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::{BusError, BusResult};
use crate::traits::{BusSubscription, PubSubBus};

const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// In-memory pub/sub bus built on `tokio::sync::broadcast`.
///
/// Intended for tests and embedding. Each named channel maps to a broadcast
/// sender; every subscriber gets its own receiver. Multiple mirrors sharing
/// one `InMemoryBus` replicate to each other within the process, which makes
/// it a faithful stand-in for a shared remote transport.
pub struct InMemoryBus {
    channels: RwLock<HashMap<String, broadcast::Sender<String>>>,
    capacity: usize,
}

/// Subscription handle over a broadcast receiver.
struct MemorySubscription {
    rx: broadcast::Receiver<String>,
}

#[async_trait]
impl BusSubscription for MemorySubscription {
    async fn recv(&mut self) -> BusResult<String> {
        match self.rx.recv().await {
            Ok(payload) => Ok(payload),
            Err(broadcast::error::RecvError::Closed) => Err(BusError::ChannelClosed),
            Err(broadcast::error::RecvError::Lagged(n)) => Err(BusError::Lagged(n)),
        }
    }
}

impl InMemoryBus {
    /// Create a new bus with the default per-channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new bus with the given per-channel buffer capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Number of channels with at least one live subscriber.
    pub fn active_channels(&self) -> usize {
        self.channels
            .read()
            .expect("bus lock poisoned")
            .values()
            .filter(|tx| tx.receiver_count() > 0)
            .count()
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PubSubBus for InMemoryBus {
    async fn publish(&self, channel: &str, payload: &str) -> BusResult<()> {
        let channels = self.channels.read().expect("bus lock poisoned");
        if let Some(tx) = channels.get(channel) {
            // A send error only means nobody is listening right now, which
            // the fire-and-forget contract treats as success.
            let _ = tx.send(payload.to_string());
        }
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> BusResult<Box<dyn BusSubscription>> {
        let mut channels = self.channels.write().expect("bus lock poisoned");
        let tx = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Ok(Box::new(MemorySubscription { rx: tx.subscribe() }))
    }

    async fn unsubscribe(&self, channel: &str) -> BusResult<()> {
        let mut channels = self.channels.write().expect("bus lock poisoned");
        // Prune the channel once its last receiver is gone; other
        // subscribers on the same channel keep theirs alive.
        if let Some(tx) = channels.get(channel) {
            if tx.receiver_count() == 0 {
                channels.remove(channel);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBus")
            .field("active_channels", &self.active_channels())
            .finish()
    }
}
