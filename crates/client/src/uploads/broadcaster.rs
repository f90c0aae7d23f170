//! Shared upload completion stream.
//!
//! Downstream UI subscribes here to learn about newly stored files. The
//! broadcaster is cloneable; every subscriber gets records published after
//! it subscribed, and publishing without subscribers is a no-op.

use api::models::FileInfo;
use tokio::sync::broadcast;
use tracing::debug;

/// Buffered records per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 64;

/// Broadcast stream of newly stored file records.
#[derive(Debug, Clone)]
pub struct UploadBroadcaster {
    tx: broadcast::Sender<FileInfo>,
}

impl UploadBroadcaster {
    /// Creates a broadcaster with no subscribers.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribes to records published from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<FileInfo> {
        self.tx.subscribe()
    }

    /// Publishes a newly stored record to all current subscribers.
    pub fn publish(&self, info: FileInfo) {
        if self.tx.send(info).is_err() {
            debug!("no upload subscribers; record dropped");
        }
    }
}

impl Default for UploadBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
