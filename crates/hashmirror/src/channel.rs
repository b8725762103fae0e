use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use hashmirror_bus::{BusError, BusSubscription};

use crate::mirror::MirrorShared;

/// Receive side of a mirror's replication channel.
///
/// Owns the task that pulls raw messages off the subscription and applies
/// them to the mirror's cache. The task holds the exact shared state it was
/// spawned for, so applying a message always mutates the intended mirror no
/// matter how many instances coexist in the process.
pub(crate) struct ReplicationChannel {
    task: JoinHandle<()>,
}

impl ReplicationChannel {
    /// Start the receive loop for the given mirror state.
    pub(crate) fn spawn(
        shared: Arc<MirrorShared>,
        mut subscription: Box<dyn BusSubscription>,
    ) -> Self {
        let task = tokio::spawn(async move {
            loop {
                match subscription.recv().await {
                    Ok(raw) => shared.apply_raw(&raw),
                    Err(BusError::Lagged(missed)) => {
                        // The subscription is still usable; the mirror is
                        // stale by `missed` mutations until peers write
                        // again.
                        warn!(missed, "replication channel lagged");
                    }
                    Err(_) => {
                        debug!("replication channel closed");
                        break;
                    }
                }
            }
        });
        Self { task }
    }

    /// Stop the receive loop and wait for it to finish, dropping its
    /// subscription so no handler can outlive the mirror.
    pub(crate) async fn teardown(self) {
        self.task.abort();
        let _ = self.task.await;
    }
}
