//! Cross-view invalidation.
//!
//! The background account sync runs outside the controller. When it
//! finishes it fires `InvalidationSignal::invalidate`, and every subscribed
//! view re-reads its current page with unchanged parameters.

use tokio::sync::broadcast;

/// Capacity of the broadcast channel. A lagging subscriber only needs to
/// know that *something* changed, so lost notifications collapse into one.
const CHANNEL_CAPACITY: usize = 16;

/// Notification that remote data changed out of band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalidated;

/// Process-wide "data changed" channel, cloned into every view that needs it
#[derive(Debug, Clone)]
pub struct InvalidationSignal {
    sender: broadcast::Sender<Invalidated>,
}

impl Default for InvalidationSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl InvalidationSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Tell every subscriber to refetch. Returns the number of subscribers reached.
    pub fn invalidate(&self) -> usize {
        // No subscribers is not an error: nothing is open
        self.sender.send(Invalidated).unwrap_or(0)
    }

    pub fn subscribe(&self) -> InvalidationReceiver {
        InvalidationReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving half held by one view
#[derive(Debug)]
pub struct InvalidationReceiver {
    receiver: broadcast::Receiver<Invalidated>,
}

impl InvalidationReceiver {
    /// Wait for the next invalidation.
    ///
    /// Returns `false` once the signal has been dropped. Missed notifications
    /// are reported as a single invalidation.
    pub async fn changed(&mut self) -> bool {
        match self.receiver.recv().await {
            Ok(Invalidated) => {
                self.drain();
                true
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "invalidation receiver lagged");
                self.drain();
                true
            }
            Err(broadcast::error::RecvError::Closed) => false,
        }
    }

    /// Swallow notifications already queued; one refetch covers them all
    fn drain(&mut self) {
        while let Ok(Invalidated) | Err(broadcast::error::TryRecvError::Lagged(_)) =
            self.receiver.try_recv()
        {}
    }
}
