//! The shared frame loop.
//!
//! The engine is externally clocked: the host calls [`Engine::frame`] once
//! per display frame (or hands control to [`Engine::run_until`]). Each tick
//! updates every live, active instance in registration order. A failing or
//! panicking instance is logged and reported without stopping the others.

use std::cell::RefCell;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};
use std::thread;
use std::time::Duration;

use crate::error::{FxError, panic_message};
use crate::render::{Animated, InstanceHandle};

use super::timing::{Clock, DEFAULT_FPS, FrameLimiter, MonotonicClock};

type WeakInstance = Weak<RefCell<dyn Animated>>;

/// Outcome of one tick.
#[derive(Debug)]
pub struct TickReport {
    pub time: f64,
    pub delta: f64,
    /// Instances whose update ran to completion.
    pub updated: usize,
    /// Instances whose update failed, by id. An instance that is borrowed
    /// elsewhere during the tick is reported as `InstanceBusy` unless it can
    /// be seen to be inactive.
    pub failures: Vec<(String, FxError)>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Engine {
    instances: Vec<(String, WeakInstance)>,
    clock: Box<dyn Clock>,
    running: bool,
    last_time: f64,
    limiter: Option<FrameLimiter>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            instances: Vec::new(),
            clock: Box::new(clock),
            running: false,
            last_time: 0.0,
            limiter: None,
        }
    }

    /// Track `instance` under `id`. Registering an id twice replaces the
    /// earlier entry and keeps its position. The engine holds a weak
    /// reference; dropped instances disappear on the next tick.
    pub fn register(&mut self, id: impl Into<String>, instance: &InstanceHandle) {
        let id = id.into();
        let weak = Rc::downgrade(instance);
        match self.instances.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = weak,
            None => {
                tracing::debug!(instance = %id, "Registered with engine");
                self.instances.push((id, weak));
            }
        }
    }

    /// Stop tracking `id`. Unknown ids are ignored.
    pub fn unregister(&mut self, id: &str) {
        let before = self.instances.len();
        self.instances.retain(|(existing, _)| existing != id);
        if self.instances.len() != before {
            tracing::debug!(instance = id, "Unregistered from engine");
        }
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_time = self.clock.now();
        tracing::info!(instances = self.instance_count(), "Engine started");
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        tracing::info!("Engine stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Registered instances that are still alive.
    pub fn instance_count(&self) -> usize {
        self.instances
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }

    /// Cap the tick rate. `None` ticks on every frame.
    pub fn set_target_fps(&mut self, fps: Option<u32>) {
        self.limiter = fps.map(FrameLimiter::new);
    }

    pub fn target_fps(&self) -> Option<u32> {
        self.limiter.as_ref().map(FrameLimiter::fps)
    }

    /// The host's per-frame callback. Runs a tick when the engine is running
    /// and the frame limiter lets it through; returns `None` otherwise.
    pub fn frame(&mut self) -> Option<TickReport> {
        if !self.running {
            return None;
        }
        let now = self.clock.now();
        if let Some(limiter) = &mut self.limiter
            && !limiter.should_render(now)
        {
            return None;
        }
        Some(self.tick(now))
    }

    /// Drive the loop on the current thread until `done` returns true for a
    /// tick report or the engine is stopped. Returns the number of ticks.
    pub fn run_until<F>(&mut self, mut done: F) -> usize
    where
        F: FnMut(&TickReport) -> bool,
    {
        let interval = self
            .limiter
            .as_ref()
            .map_or(1000.0 / DEFAULT_FPS as f64, FrameLimiter::frame_interval);
        let mut ticks = 0;

        while self.running {
            if let Some(report) = self.frame() {
                ticks += 1;
                if done(&report) {
                    break;
                }
            }
            thread::sleep(Duration::from_secs_f64(interval / 1000.0));
        }
        ticks
    }

    fn tick(&mut self, time: f64) -> TickReport {
        let delta = (time - self.last_time).max(0.0);
        self.last_time = time;
        self.instances.retain(|(_, weak)| weak.strong_count() > 0);

        let mut report = TickReport {
            time,
            delta,
            updated: 0,
            failures: Vec::new(),
        };

        for (id, weak) in &self.instances {
            let Some(handle) = weak.upgrade() else {
                continue;
            };
            let Ok(mut instance) = handle.try_borrow_mut() else {
                // Under a shared borrow the status is still readable and an
                // inactive instance is skipped as usual. Under a mutable
                // borrow it is not, so the instance counts as busy.
                let inactive = handle.try_borrow().is_ok_and(|i| !i.is_active());
                if !inactive {
                    report.failures.push((id.clone(), FxError::InstanceBusy { id: id.clone() }));
                }
                continue;
            };
            if !instance.is_active() {
                continue;
            }

            let outcome = catch_unwind(AssertUnwindSafe(|| instance.update(time, delta)));
            let error = match outcome {
                Ok(Ok(())) => {
                    report.updated += 1;
                    continue;
                }
                Ok(Err(error)) => error,
                Err(payload) => FxError::InstancePanicked {
                    id: id.clone(),
                    message: panic_message(payload.as_ref()),
                },
            };
            tracing::warn!(instance = %id, error = %error, "Instance update failed");
            report.failures.push((id.clone(), error));
        }

        tracing::trace!(time, delta, updated = report.updated, "Tick");
        report
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("instances", &self.instances.iter().map(|(id, _)| id).collect::<Vec<_>>())
            .field("running", &self.running)
            .field("last_time", &self.last_time)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timing::ManualClock;
    use crate::render::BaseInstance;
    use crate::surface::{BufferSurface, SharedSurface};
    use crate::types::Extent;

    struct Counter {
        base: BaseInstance,
        calls: Rc<RefCell<Vec<(f64, f64)>>>,
    }

    impl Animated for Counter {
        fn base(&self) -> &BaseInstance {
            &self.base
        }
        fn base_mut(&mut self) -> &mut BaseInstance {
            &mut self.base
        }
        fn render(&mut self, time: f64, delta: f64) -> Result<(), FxError> {
            self.calls.borrow_mut().push((time, delta));
            Ok(())
        }
    }

    fn counter(id: &str) -> (InstanceHandle, Rc<RefCell<Vec<(f64, f64)>>>) {
        let surface: SharedSurface = Rc::new(RefCell::new(BufferSurface::new(Extent::new(1, 1))));
        let calls = Rc::new(RefCell::new(Vec::new()));
        let instance: InstanceHandle = Rc::new(RefCell::new(Counter {
            base: BaseInstance::new(id, surface),
            calls: calls.clone(),
        }));
        (instance, calls)
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut engine = Engine::with_clock(ManualClock::new(0.0));
        engine.start();
        engine.start();
        assert!(engine.is_running());
        engine.stop();
        engine.stop();
        assert!(!engine.is_running());
        assert!(engine.frame().is_none());
    }

    #[test]
    fn ticks_measure_delta_from_previous_tick() {
        let clock = ManualClock::new(100.0);
        let mut engine = Engine::with_clock(clock.clone());
        let (instance, calls) = counter("a");
        instance.borrow_mut().play();
        engine.register("a", &instance);
        engine.start();

        clock.advance(16.0);
        engine.frame().unwrap();
        clock.advance(20.0);
        engine.frame().unwrap();

        assert_eq!(*calls.borrow(), vec![(116.0, 16.0), (136.0, 20.0)]);
    }

    #[test]
    fn register_overwrites_and_unregister_ignores_unknown() {
        let mut engine = Engine::with_clock(ManualClock::new(0.0));
        let (first, _) = counter("a");
        let (second, second_calls) = counter("a");
        second.borrow_mut().play();
        engine.register("a", &first);
        engine.register("a", &second);
        assert_eq!(engine.instance_count(), 1);

        engine.start();
        engine.frame().unwrap();
        assert_eq!(second_calls.borrow().len(), 1);

        engine.unregister("missing");
        engine.unregister("a");
        assert_eq!(engine.instance_count(), 0);
    }

    #[test]
    fn dropped_instances_are_pruned() {
        let mut engine = Engine::with_clock(ManualClock::new(0.0));
        let (instance, _) = counter("a");
        engine.register("a", &instance);
        assert_eq!(engine.instance_count(), 1);
        drop(instance);
        assert_eq!(engine.instance_count(), 0);
    }

    #[test]
    fn limiter_skips_early_frames() {
        let clock = ManualClock::new(0.0);
        let mut engine = Engine::with_clock(clock.clone());
        engine.set_target_fps(Some(10));
        engine.start();

        assert!(engine.frame().is_some());
        clock.advance(50.0);
        assert!(engine.frame().is_none());
        assert!(engine.is_running());
        clock.advance(50.0);
        assert!(engine.frame().is_some());
    }

    #[test]
    fn busy_instance_is_reported() {
        let mut engine = Engine::with_clock(ManualClock::new(0.0));
        let (instance, calls) = counter("a");
        instance.borrow_mut().play();
        engine.register("a", &instance);
        engine.start();

        let guard = instance.borrow();
        let report = engine.frame().unwrap();
        drop(guard);

        assert!(matches!(report.failures[..], [(_, FxError::InstanceBusy { .. })]));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn borrowed_inactive_instance_is_skipped() {
        let mut engine = Engine::with_clock(ManualClock::new(0.0));
        let (paused, _) = counter("paused");
        paused.borrow_mut().play();
        paused.borrow_mut().pause();
        let (idle, _) = counter("idle");
        engine.register("paused", &paused);
        engine.register("idle", &idle);
        engine.start();

        let paused_guard = paused.borrow();
        let report = engine.frame().unwrap();
        drop(paused_guard);
        assert!(report.is_clean());

        // Exclusively borrowed: the status cannot be read.
        let idle_guard = idle.borrow_mut();
        let report = engine.frame().unwrap();
        drop(idle_guard);
        assert!(matches!(&report.failures[..], [(id, FxError::InstanceBusy { .. })] if id == "idle"));
    }

    #[test]
    fn run_until_stops_on_predicate() {
        let clock = ManualClock::new(0.0);
        let mut engine = Engine::with_clock(clock.clone());
        engine.set_target_fps(Some(1000));
        engine.start();
        let ticks = engine.run_until(|report| {
            clock.advance(1.0);
            report.time >= 3.0
        });
        assert_eq!(ticks, 4);
    }
}
