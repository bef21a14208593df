//! Broadcast fan-out of unsolicited events.
//!
//! Each [`EventKind`] has its own `tokio::sync::broadcast` channel, created
//! the first time someone subscribes or publishes. Publishing never blocks:
//! a subscriber that falls behind loses the oldest events and sees
//! `RecvError::Lagged`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use tokio::sync::broadcast;
use tracing::trace;

use crate::decoder::DecodedResponse;
use crate::protocol::UnsolicitedKind;

pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// What an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Decoded unsolicited frame of this kind.
    Unsolicited(UnsolicitedKind),
    /// A call in the list reports voice privacy.
    VoicePrivacyOn,
    /// A call in the list reports no voice privacy.
    VoicePrivacyOff,
    /// The call list went empty while an emergency dial was in progress.
    EmergencyCallEnded,
}

impl From<UnsolicitedKind> for EventKind {
    fn from(kind: UnsolicitedKind) -> Self {
        EventKind::Unsolicited(kind)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Unsolicited(kind) => write!(f, "{}", kind),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub value: DecodedResponse,
}

impl Event {
    pub fn new(kind: impl Into<EventKind>, value: DecodedResponse) -> Self {
        Self {
            kind: kind.into(),
            value,
        }
    }
}

pub type EventReceiver = broadcast::Receiver<Event>;

/// Registry of per-kind broadcast channels.
pub struct EventBus {
    capacity: usize,
    channels: Mutex<HashMap<EventKind, broadcast::Sender<Event>>>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn sender(&self, kind: EventKind) -> broadcast::Sender<Event> {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels
            .entry(kind)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    pub fn subscribe(&self, kind: impl Into<EventKind>) -> EventReceiver {
        self.sender(kind.into()).subscribe()
    }

    /// Deliver `event` to current subscribers of its kind.
    ///
    /// Returns the number of subscribers reached.
    pub fn publish(&self, event: Event) -> usize {
        let kind = event.kind;
        let reached = self.sender(kind).send(event).unwrap_or(0);
        trace!("published {} to {} subscribers", kind, reached);
        reached
    }

    pub fn subscriber_count(&self, kind: impl Into<EventKind>) -> usize {
        let kind = kind.into();
        self.channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&kind)
            .map(broadcast::Sender::receiver_count)
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
