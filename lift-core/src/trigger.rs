//! Trigger classification (§3).

use std::fmt;

/// Classification of the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Http,
    WebSocket,
    Queue,
    ObjectStore,
    EventBus,
    Timer,
    Stream,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Http => "HTTP",
            Trigger::WebSocket => "WEBSOCKET",
            Trigger::Queue => "QUEUE",
            Trigger::ObjectStore => "OBJECT_STORE",
            Trigger::EventBus => "EVENT_BUS",
            Trigger::Timer => "TIMER",
            Trigger::Stream => "STREAM",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
