//! Lifecycle state shared by every animated instance.

use std::fmt;

use crate::surface::SharedSurface;

use super::chain::EffectChain;
use super::events::{EventBus, EventKind, LifecycleEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Active,
    Paused,
    Stopped,
}

/// Id, status, timing, effect chain and subscribers of one instance.
///
/// Specializations embed a `BaseInstance` and expose it through
/// [`Animated::base`](super::Animated::base).
pub struct BaseInstance {
    id: String,
    surface: SharedSurface,
    status: Status,
    start_time: Option<f64>,
    effects: EffectChain,
    events: EventBus,
}

impl BaseInstance {
    pub fn new(id: impl Into<String>, surface: SharedSurface) -> Self {
        let id = id.into();
        tracing::debug!(instance = %id, "Instance created");
        Self {
            id,
            surface,
            status: Status::Idle,
            start_time: None,
            effects: EffectChain::new(),
            events: EventBus::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    /// Milliseconds since the first update after the last `play`, or 0 when
    /// that update has not happened yet.
    pub fn elapsed(&self, time: f64) -> f64 {
        self.start_time.map_or(0.0, |start| time - start)
    }

    /// Record the first update after activation.
    pub(crate) fn mark_started(&mut self, time: f64) {
        if self.start_time.is_none() {
            self.start_time = Some(time);
        }
    }

    pub fn effects(&self) -> &EffectChain {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectChain {
        &mut self.effects
    }

    /// Activate and restart elapsed time. Calling `play` on an instance
    /// that is already active restarts it as well.
    pub fn play(&mut self) {
        self.status = Status::Active;
        self.start_time = None;
        self.emit(EventKind::Start);
    }

    pub fn pause(&mut self) {
        self.status = Status::Paused;
        self.emit(EventKind::Pause);
    }

    pub fn stop(&mut self) {
        self.status = Status::Stopped;
        self.start_time = None;
        self.emit(EventKind::Stop);
    }

    pub fn on<F>(&mut self, kind: EventKind, callback: F)
    where
        F: FnMut(&LifecycleEvent<'_>) + 'static,
    {
        self.events.subscribe(kind, Box::new(callback));
    }

    pub fn emit(&mut self, kind: EventKind) {
        tracing::debug!(instance = %self.id, event = %kind, status = ?self.status, "Lifecycle event");
        let event = LifecycleEvent {
            kind,
            instance_id: &self.id,
            status: self.status,
        };
        self.events.emit(&event);
    }
}

impl fmt::Debug for BaseInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseInstance")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("start_time", &self.start_time)
            .field("effects", &self.effects)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::surface::BufferSurface;
    use crate::types::Extent;

    fn instance() -> BaseInstance {
        let surface: SharedSurface = Rc::new(RefCell::new(BufferSurface::new(Extent::new(4, 1))));
        BaseInstance::new("text-1", surface)
    }

    #[test]
    fn starts_idle() {
        let base = instance();
        assert_eq!(base.status(), Status::Idle);
        assert!(!base.is_active());
        assert_eq!(base.start_time(), None);
        assert_eq!(base.elapsed(500.0), 0.0);
    }

    #[test]
    fn transitions() {
        let mut base = instance();
        base.play();
        assert_eq!(base.status(), Status::Active);
        base.mark_started(100.0);
        base.mark_started(200.0);
        assert_eq!(base.start_time(), Some(100.0));
        assert_eq!(base.elapsed(350.0), 250.0);

        base.pause();
        assert_eq!(base.status(), Status::Paused);
        assert_eq!(base.start_time(), Some(100.0));

        base.play();
        assert_eq!(base.start_time(), None);

        base.stop();
        assert_eq!(base.status(), Status::Stopped);
        assert_eq!(base.start_time(), None);
    }

    #[test]
    fn events_carry_status_after_transition() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut base = instance();
        for kind in [EventKind::Start, EventKind::Pause, EventKind::Stop] {
            let seen = seen.clone();
            base.on(kind, move |event| {
                seen.borrow_mut()
                    .push((event.kind, event.instance_id.to_string(), event.status));
            });
        }

        base.play();
        base.pause();
        base.stop();

        assert_eq!(
            *seen.borrow(),
            vec![
                (EventKind::Start, "text-1".to_string(), Status::Active),
                (EventKind::Pause, "text-1".to_string(), Status::Paused),
                (EventKind::Stop, "text-1".to_string(), Status::Stopped),
            ]
        );
    }
}
