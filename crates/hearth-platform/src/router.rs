use std::collections::HashMap;

use hearth_core::Message;

use crate::error::PlatformResult;

/// Handler invoked with the routing context and the inbound message.
pub type Handler<C> = fn(&C, &Message) -> PlatformResult<()>;

/// Explicit topic → handler table.
pub struct EventRouter<C> {
    handlers: HashMap<String, Handler<C>>,
}

impl<C> EventRouter<C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Route `topic` to `handler`, replacing any earlier handler for it.
    pub fn on(&mut self, topic: &str, handler: Handler<C>) {
        self.handlers.insert(topic.to_string(), handler);
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn is_registered(&self, topic: &str) -> bool {
        self.handlers.contains_key(topic)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler for `message`. Handler errors are logged, never returned.
    /// Returns whether a handler was registered for the topic.
    pub fn dispatch(&self, ctx: &C, message: &Message) -> bool {
        match self.handlers.get(&message.msg_type) {
            Some(handler) => {
                if let Err(e) = handler(ctx, message) {
                    tracing::error!("Handler for {} failed: {e}", message.msg_type);
                }
                true
            }
            None => {
                tracing::trace!("No handler for {}", message.msg_type);
                false
            }
        }
    }
}

impl<C> Default for EventRouter<C> {
    fn default() -> Self {
        Self::new()
    }
}
