//! Animated instances: the lifecycle base, the effect chain and the
//! concrete text and background specializations.

mod base;
pub mod canvas_grid;
pub mod chain;
pub mod events;
pub mod noise;
pub mod text_block;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::FxError;

pub use base::{BaseInstance, Status};
pub use canvas_grid::{CanvasGrid, CanvasGridConfig, Generator};
pub use chain::{Composition, EffectChain};
pub use events::{EventBus, EventKind, LifecycleEvent};
pub use noise::{Noise, NoiseConfig};
pub use text_block::{RenderMode, TextBlock, TextBlockConfig};

/// The role the engine drives once per tick.
///
/// Implementors provide `base`/`base_mut` and override `render`; the
/// lifecycle methods are shared.
pub trait Animated {
    fn base(&self) -> &BaseInstance;

    fn base_mut(&mut self) -> &mut BaseInstance;

    /// Produce one frame. Types that do not draw anything must still
    /// override this; the default reports the missing override.
    fn render(&mut self, _time: f64, _delta: f64) -> Result<(), FxError> {
        Err(FxError::ContractViolation { method: "render" })
    }

    /// Called by the engine every tick. Does nothing unless the instance is
    /// active; the first update after `play` captures the start time.
    fn update(&mut self, time: f64, delta: f64) -> Result<(), FxError> {
        if !self.base().is_active() {
            return Ok(());
        }
        self.base_mut().mark_started(time);
        self.render(time, delta)
    }

    fn id(&self) -> &str {
        self.base().id()
    }

    fn is_active(&self) -> bool {
        self.base().is_active()
    }

    fn status(&self) -> Status {
        self.base().status()
    }

    fn play(&mut self) {
        self.base_mut().play();
    }

    fn pause(&mut self) {
        self.base_mut().pause();
    }

    fn stop(&mut self) {
        self.base_mut().stop();
    }

    fn on(&mut self, kind: EventKind, callback: Box<dyn FnMut(&LifecycleEvent<'_>)>) {
        self.base_mut().on(kind, callback);
    }

    /// Release and drop every effect in the chain.
    fn clear_effects(&mut self) {
        self.base_mut().effects_mut().clear();
    }

    /// Stop, tear down the chain and notify `Destroy` subscribers.
    fn destroy(&mut self) {
        self.stop();
        self.clear_effects();
        self.base_mut().emit(EventKind::Destroy);
    }
}

impl Animated for BaseInstance {
    fn base(&self) -> &BaseInstance {
        self
    }

    fn base_mut(&mut self) -> &mut BaseInstance {
        self
    }
}

pub type InstanceHandle = Rc<RefCell<dyn Animated>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{BufferSurface, SharedSurface};
    use crate::types::Extent;

    fn base() -> BaseInstance {
        let surface: SharedSurface = Rc::new(RefCell::new(BufferSurface::new(Extent::new(1, 1))));
        BaseInstance::new("base-1", surface)
    }

    #[test]
    fn base_render_is_a_contract_violation() {
        let mut instance = base();
        let err = Animated::render(&mut instance, 16.0, 16.0).unwrap_err();
        assert!(matches!(err, FxError::ContractViolation { method: "render" }));
        assert_eq!(err.to_string(), "render() must be implemented");
    }

    #[test]
    fn update_is_a_no_op_unless_active() {
        let mut instance = base();
        assert!(instance.update(16.0, 16.0).is_ok());
        assert_eq!(instance.start_time(), None);

        Animated::play(&mut instance);
        assert!(instance.update(16.0, 16.0).is_err());
        assert_eq!(instance.start_time(), Some(16.0));
    }

    #[test]
    fn destroy_stops_and_notifies() {
        let destroyed = Rc::new(RefCell::new(false));
        let mut instance = base();
        {
            let destroyed = destroyed.clone();
            Animated::on(
                &mut instance,
                EventKind::Destroy,
                Box::new(move |_| *destroyed.borrow_mut() = true),
            );
        }
        Animated::play(&mut instance);
        instance.destroy();

        assert!(*destroyed.borrow());
        assert_eq!(Animated::status(&instance), Status::Stopped);
    }
}
