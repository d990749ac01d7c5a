use alloc::{sync::Arc, vec::Vec};
use core::fmt::Debug;

pub type Callback = Arc<dyn Fn() + Send + Sync>;

custom_type!(EventId, usize);

#[derive(Debug, Default)]
pub struct Queue {
    events: Vec<Event>,
    next_id: usize,
}

pub struct Event {
    pub id: EventId,
    /// `None` while the event is not armed.
    pub at_tick: Option<u64>,
    /// Callbacks popped but not yet finished.
    pub running: usize,
    pub callback: Callback,
}

impl Debug for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("at_tick", &self.at_tick)
            .field("running", &self.running)
            .finish()
    }
}

impl Queue {
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
        }
    }

    pub fn insert(&mut self, callback: Callback) -> EventId {
        // id 0 is reserved as "no event"
        if self.next_id == 0 {
            self.next_id = 1;
        }
        let id = EventId::from(self.next_id);
        self.next_id += 1;
        self.events.push(Event {
            id,
            at_tick: None,
            running: 0,
            callback,
        });
        id
    }

    pub fn remove(&mut self, id: EventId) -> Option<Event> {
        let idx = self.events.iter().position(|e| e.id == id)?;
        Some(self.events.swap_remove(idx))
    }

    /// Arms `id` to fire at `at_tick`, replacing an earlier deadline.
    ///
    /// Returns whether the event was already pending.
    pub fn arm(&mut self, id: EventId, at_tick: u64) -> bool {
        match self.get_mut(id) {
            Some(e) => e.at_tick.replace(at_tick).is_some(),
            None => false,
        }
    }

    /// Returns whether the event was pending.
    pub fn disarm(&mut self, id: EventId) -> bool {
        match self.get_mut(id) {
            Some(e) => e.at_tick.take().is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: EventId) -> bool {
        self.events
            .iter()
            .any(|e| e.id == id && e.at_tick.is_some())
    }

    pub fn next_tick(&self) -> Option<u64> {
        self.events.iter().filter_map(|e| e.at_tick).min()
    }

    /// Takes the earliest event due at `now`, leaving it disarmed and
    /// marked running until [`Queue::finish`].
    pub fn pop(&mut self, now: u64) -> Option<(EventId, Callback)> {
        let e = self
            .events
            .iter_mut()
            .filter(|e| matches!(e.at_tick, Some(at) if at <= now))
            .min_by_key(|e| e.at_tick)?;
        e.at_tick = None;
        e.running += 1;
        Some((e.id, e.callback.clone()))
    }

    pub fn finish(&mut self, id: EventId) {
        if let Some(e) = self.get_mut(id) {
            e.running = e.running.saturating_sub(1);
        }
    }

    pub fn is_running(&self, id: EventId) -> bool {
        self.events.iter().any(|e| e.id == id && e.running > 0)
    }

    fn get_mut(&mut self, id: EventId) -> Option<&mut Event> {
        self.events.iter_mut().find(|e| e.id == id)
    }
}
