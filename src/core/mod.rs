//! Scheduling core: timing helpers, the instance registry and the engine.

pub mod engine;
pub mod registry;
pub mod timing;

pub use engine::{Engine, TickReport};
pub use registry::Registry;
pub use timing::{Clock, DEFAULT_FPS, Easing, FrameLimiter, ManualClock, MonotonicClock};
