//! Timing utilities: progress, easing curves, frame limiting and clocks.
//!
//! All times are milliseconds as `f64`.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Fraction of `duration` covered by `elapsed`, clamped to [0, 1].
///
/// A zero (or negative) duration is always complete.
pub fn progress(elapsed: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return 1.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

/// Progress of an animation that started at `start` as seen at `now`.
pub fn progress_between(start: f64, now: f64, duration: f64) -> f64 {
    progress(now - start, duration)
}

// ---------------------------------------------------------------------------
// Easing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
}

impl Easing {
    pub const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
    ];

    /// Reshape a normalized progress value.
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => t * (2.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
                }
            }
        }
    }

    /// Eased progress of `elapsed` over `duration`.
    pub fn progress(self, elapsed: f64, duration: f64) -> f64 {
        self.apply(progress(elapsed, duration))
    }
}

// ---------------------------------------------------------------------------
// Frame limiter
// ---------------------------------------------------------------------------

pub const DEFAULT_FPS: u32 = 60;

/// Decides whether enough time has passed since the last accepted frame.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    target_fps: u32,
    frame_interval: f64,
    last_frame_time: Option<f64>,
}

impl Default for FrameLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

impl FrameLimiter {
    pub fn new(fps: u32) -> Self {
        let fps = fps.max(1);
        Self {
            target_fps: fps,
            frame_interval: 1000.0 / fps as f64,
            last_frame_time: None,
        }
    }

    /// The first call always accepts and initializes the limiter.
    pub fn should_render(&mut self, now: f64) -> bool {
        match self.last_frame_time {
            None => {
                self.last_frame_time = Some(now);
                true
            }
            Some(last) if now - last >= self.frame_interval => {
                self.last_frame_time = Some(now);
                true
            }
            Some(_) => false,
        }
    }

    pub fn set_fps(&mut self, fps: u32) {
        let fps = fps.max(1);
        self.target_fps = fps;
        self.frame_interval = 1000.0 / fps as f64;
    }

    pub fn fps(&self) -> u32 {
        self.target_fps
    }

    pub fn frame_interval(&self) -> f64 {
        self.frame_interval
    }
}

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Time source for the engine loop.
pub trait Clock {
    /// Current time in milliseconds.
    fn now(&self) -> f64;
}

/// Milliseconds elapsed since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock advanced by hand. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}
