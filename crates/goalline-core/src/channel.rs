//! Event channel between this client and the other participants.

use std::collections::HashMap;

/// Handler invoked with the payload of an inbound event.
pub type InboundHandler = Box<dyn FnMut(&serde_json::Value)>;

/// Bidirectional, ordered message bus to other participants.
///
/// Sends are fire-and-forget. The host delivers inbound events by invoking
/// the handlers registered with [`EventChannel::on`], one at a time.
pub trait EventChannel {
    /// Send an event. Delivery is best-effort.
    fn send(&mut self, event: &str, payload: serde_json::Value);

    /// Register a handler for an inbound event.
    fn on(&mut self, event: &str, handler: InboundHandler);
}

/// Inbound handlers keyed by event name.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Vec<InboundHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, event: &str, handler: InboundHandler) {
        self.handlers.entry(event.to_string()).or_default().push(handler);
    }

    /// Deliver an inbound event to every handler registered for it.
    /// Returns false if nobody listens for `event`.
    pub fn dispatch(&mut self, event: &str, payload: &serde_json::Value) -> bool {
        match self.handlers.get_mut(event) {
            Some(handlers) if !handlers.is_empty() => {
                for handler in handlers.iter_mut() {
                    handler(payload);
                }
                true
            }
            _ => {
                log::debug!("No handler for inbound event '{}'", event);
                false
            }
        }
    }

    /// Whether anything listens for `event`.
    pub fn has_handler(&self, event: &str) -> bool {
        self.handlers.get(event).is_some_and(|h| !h.is_empty())
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

/// In-memory channel that records outgoing events and dispatches inbound
/// ones to its handlers.
#[derive(Debug, Default)]
pub struct LocalChannel {
    /// Sent events, oldest first.
    outgoing: Vec<(String, serde_json::Value)>,
    handlers: HandlerRegistry,
}

impl LocalChannel {
    /// Create a new empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver an inbound event to its handlers. Returns false if nobody
    /// listens for `event`.
    pub fn dispatch(&mut self, event: &str, payload: &serde_json::Value) -> bool {
        self.handlers.dispatch(event, payload)
    }

    /// Sent events not yet taken.
    pub fn outgoing(&self) -> &[(String, serde_json::Value)] {
        &self.outgoing
    }

    /// Take pending outgoing events (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<(String, serde_json::Value)> {
        std::mem::take(&mut self.outgoing)
    }

    /// Check if there are pending outgoing events.
    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    pub fn has_handler(&self, event: &str) -> bool {
        self.handlers.has_handler(event)
    }
}

impl EventChannel for LocalChannel {
    fn send(&mut self, event: &str, payload: serde_json::Value) {
        self.outgoing.push((event.to_string(), payload));
    }

    fn on(&mut self, event: &str, handler: InboundHandler) {
        self.handlers.register(event, handler);
    }
}
