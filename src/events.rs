use tokio::sync::broadcast;
use tracing::debug;

/// State-change notification for whatever renders the cart. Rendering
/// subscribes to these instead of being interleaved with the mutation
/// path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// The local mirror was replaced with a fresh server response.
    Updated,
    /// Checkout succeeded and the cart was cleared.
    CheckedOut { order_id: String },
}

/// Broadcast handle for cart events.
///
/// Sending never fails the mutation that produced the event: with no
/// renderer subscribed the event is dropped and logged.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: broadcast::Sender<CartEvent>,
}

impl EventSender {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.sender.subscribe()
    }

    /// Sends an event, logging instead of failing when nobody listens.
    pub fn send_or_log(&self, event: CartEvent) {
        if let Err(err) = self.sender.send(event) {
            debug!(event = ?err.0, "no renderer subscribed, dropping event");
        }
    }
}

impl Default for EventSender {
    fn default() -> Self {
        Self::new(16)
    }
}
