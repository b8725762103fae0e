use async_trait::async_trait;

use crate::error::BusResult;

/// A live subscription to one channel.
///
/// Dropping the subscription stops delivery; [`PubSubBus::unsubscribe`]
/// additionally lets the transport release per-channel resources.
#[async_trait]
pub trait BusSubscription: Send {
    /// Wait for the next raw payload on the channel.
    ///
    /// Returns [`BusError::ChannelClosed`] once no further messages can
    /// arrive, and [`BusError::Lagged`] if messages were dropped because the
    /// subscriber fell behind; after a lag the subscription remains usable.
    ///
    /// [`BusError::ChannelClosed`]: crate::error::BusError::ChannelClosed
    /// [`BusError::Lagged`]: crate::error::BusError::Lagged
    async fn recv(&mut self) -> BusResult<String>;
}

/// Publish/subscribe transport over named channels of text payloads.
///
/// Publishing is fire-and-forget: no delivery acknowledgement, no retry, and
/// publishing to a channel nobody subscribes to succeeds. No delivery-order
/// guarantee is assumed relative to store completions.
#[async_trait]
pub trait PubSubBus: Send + Sync {
    /// Publish a raw text payload on the named channel.
    async fn publish(&self, channel: &str, payload: &str) -> BusResult<()>;

    /// Subscribe to the named channel and start receiving payloads.
    async fn subscribe(&self, channel: &str) -> BusResult<Box<dyn BusSubscription>>;

    /// Release transport resources for the named channel once the caller's
    /// subscription has been dropped.
    async fn unsubscribe(&self, channel: &str) -> BusResult<()>;
}
