//! Event bus owned by a battle
//!
//! Subscribers are plain closures called synchronously, in subscription
//! order, for every event. Events are also kept in a log until drained.

use std::fmt;

use wizmatch_core::EventSink;
use wizmatch_types::Event;

pub type Subscriber = Box<dyn FnMut(&Event)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u32,
    log: Vec<Event>,
    recording: bool,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            next_id: 0,
            log: Vec::new(),
            recording: true,
        }
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&Event) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Stop or resume keeping events for [`EventBus::drain`]
    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
        if !recording {
            self.log.clear();
        }
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.log)
    }

    pub fn pending(&self) -> &[Event] {
        &self.log
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventBus {
    fn emit(&mut self, event: Event) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&event);
        }
        if self.recording {
            self.log.push(event);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("logged", &self.log.len())
            .field("recording", &self.recording)
            .finish()
    }
}
