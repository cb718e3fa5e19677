//! Typed lifecycle events.

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::panic_message;

use super::base::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    Pause,
    Stop,
    Destroy,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Pause => "pause",
            EventKind::Stop => "stop",
            EventKind::Destroy => "destroy",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LifecycleEvent<'a> {
    pub kind: EventKind,
    pub instance_id: &'a str,
    /// Status after the transition.
    pub status: Status,
}

pub type Callback = Box<dyn FnMut(&LifecycleEvent<'_>)>;

/// Subscribers per event kind, called in subscription order.
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<EventKind, Vec<Callback>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind, callback: Callback) {
        self.subscribers.entry(kind).or_default().push(callback);
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }

    /// Deliver `event` to every subscriber of its kind. A panicking
    /// subscriber is logged and skipped; the rest still run.
    pub fn emit(&mut self, event: &LifecycleEvent<'_>) {
        let Some(callbacks) = self.subscribers.get_mut(&event.kind) else {
            return;
        };
        for (index, callback) in callbacks.iter_mut().enumerate() {
            let result = catch_unwind(AssertUnwindSafe(|| callback(event)));
            if let Err(payload) = result {
                tracing::warn!(
                    instance = event.instance_id,
                    event = %event.kind,
                    subscriber = index,
                    error = %panic_message(payload.as_ref()),
                    "Event subscriber panicked"
                );
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (kind, callbacks) in &self.subscribers {
            map.entry(kind, &callbacks.len());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn event(kind: EventKind) -> LifecycleEvent<'static> {
        LifecycleEvent {
            kind,
            instance_id: "text-1",
            status: Status::Active,
        }
    }

    #[test]
    fn delivers_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for n in 0..3 {
            let log = log.clone();
            bus.subscribe(EventKind::Start, Box::new(move |_| log.borrow_mut().push(n)));
        }
        bus.emit(&event(EventKind::Start));
        bus.emit(&event(EventKind::Stop));
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn panicking_subscriber_does_not_block_others() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        bus.subscribe(EventKind::Pause, Box::new(|_| panic!("boom")));
        {
            let hits = hits.clone();
            bus.subscribe(EventKind::Pause, Box::new(move |_| *hits.borrow_mut() += 1));
        }
        bus.emit(&event(EventKind::Pause));
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(bus.subscriber_count(EventKind::Pause), 2);
    }
}
