use std::sync::Arc;

use tokio::sync::watch;

/// Payload-free signal that forces the feed to recompute.
///
/// Needed because clearing an already empty cache changes no rows and so
/// produces no store notification.
#[derive(Debug, Clone)]
pub struct RepublishSignal {
    tx: Arc<watch::Sender<u64>>,
}

impl RepublishSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Request a recomputation.
    pub fn tick(&self) {
        self.tx.send_modify(|tick| *tick = tick.wrapping_add(1));
    }

    /// Current tick count.
    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }
}

impl Default for RepublishSignal {
    fn default() -> Self {
        Self::new()
    }
}
