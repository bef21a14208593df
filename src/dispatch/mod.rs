//! Inbound routing.
//!
//! - [`Dispatcher`] - sends solicited frames to their pending request and
//!   unsolicited frames to the event bus
//! - [`EventBus`] - per-kind broadcast channels
//! - [`SessionState`] - flags read and cleared by dispatch side effects

mod dispatcher;
mod events;
mod state;

pub use dispatcher::Dispatcher;
pub use events::{Event, EventBus, EventKind, EventReceiver, DEFAULT_EVENT_CAPACITY};
pub use state::SessionState;
