use serde::Serialize;
use tokio::sync::broadcast;
use tracing::warn;

use crate::dto::sse::ServerEvent;

/// Fan-out channel feeding every connected board.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Create a hub buffering up to `capacity` events per lagging subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a subscriber receiving events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Number of boards currently listening.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Serialize `payload` and publish it under the `event` name.
    ///
    /// Nobody listening is not an error; a payload that fails to serialize is logged
    /// and dropped.
    pub fn publish(&self, event: &str, payload: &impl Serialize) {
        match ServerEvent::json(event, payload) {
            Ok(message) => {
                let _ = self.sender.send(message);
            }
            Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
        }
    }
}
