//! Explicit observer mechanism for session state changes.
//!
//! Mutators publish events after completing a mutation; there is no
//! interception of field writes. A rendering layer subscribes to repaint
//! threads and toggle input state.

use std::sync::Arc;

use crate::types::Message;

/// A state change worth rendering.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A message was appended to a conversation.
    MessageAppended {
        conversation_id: String,
        message: Message,
    },
    /// A turn started or finished.
    TurnStateChanged { processing: bool },
}

/// Callback receiving session events.
pub type EventSink = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// Fan-out of session events to subscribers, in subscription order.
#[derive(Default)]
pub struct EventBus {
    sinks: Vec<EventSink>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: EventSink) {
        self.sinks.push(sink);
    }

    pub fn emit(&self, event: &SessionEvent) {
        for sink in &self.sinks {
            (sink)(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.sinks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn events_reach_every_subscriber() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["a", "b"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(Arc::new(move |event| {
                if let SessionEvent::TurnStateChanged { processing } = event {
                    seen.lock().unwrap().push(format!("{tag}:{processing}"));
                }
            }));
        }
        bus.emit(&SessionEvent::TurnStateChanged { processing: true });
        assert_eq!(*seen.lock().unwrap(), ["a:true", "b:true"]);
    }
}
