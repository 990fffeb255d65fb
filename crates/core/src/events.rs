//! Event sinks
//!
//! Board and combat code report every state change through an
//! [`EventSink`] handed to them by reference. There is no global event
//! state: whoever owns the simulation decides where events go.

use crate::types::Event;

pub trait EventSink {
    fn emit(&mut self, event: Event);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: Event) {}
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}
