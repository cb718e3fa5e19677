//! Value noise for procedural backgrounds.
//!
//! Integer-hashed lattice values, smoothed over their neighbours, cosine
//! interpolated and summed over octaves. The result is a density in `[0, 1]`
//! suitable as a [`CanvasGrid`](super::CanvasGrid) generator.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Lattice frequency of the first octave, per cell.
    pub scale: f64,
    pub octaves: u32,
    /// Amplitude falloff between octaves.
    pub persistence: f64,
    /// Reseeds per millisecond. The field changes in whole steps.
    pub speed: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            scale: 0.1,
            octaves: 3,
            persistence: 0.5,
            speed: 0.001,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Noise {
    config: NoiseConfig,
}

impl Noise {
    pub fn new(config: NoiseConfig) -> Self {
        Self { config }
    }

    /// Density at cell `(x, y)` and engine time `time` (ms).
    pub fn sample(&self, x: usize, y: usize, time: f64) -> f64 {
        let seed = (time * self.config.speed) as i32;
        let mut total = 0.0;
        let mut frequency = self.config.scale;
        let mut amplitude = 1.0;
        let mut max = 0.0;

        for _ in 0..self.config.octaves.max(1) {
            total += interpolated(x as f64 * frequency, y as f64 * frequency, seed) * amplitude;
            max += amplitude;
            amplitude *= self.config.persistence;
            frequency *= 2.0;
        }

        ((total / max + 1.0) / 2.0).clamp(0.0, 1.0)
    }

    /// This noise as a closure for `CanvasGrid::set_generator`.
    pub fn into_generator(self) -> impl FnMut(usize, usize, f64) -> f64 + 'static {
        move |x, y, time| self.sample(x, y, time)
    }
}

/// Pseudo-random lattice value in `(-1, 1]`.
fn lattice(x: i32, y: i32, seed: i32) -> f64 {
    let n = x.wrapping_add(y.wrapping_mul(57)).wrapping_add(seed);
    let n = (n << 13) ^ n;
    let v = n
        .wrapping_mul(n.wrapping_mul(n).wrapping_mul(15731).wrapping_add(789_221))
        .wrapping_add(1_376_312_589);
    1.0 - (v & 0x7fff_ffff) as f64 / 1_073_741_824.0
}

fn smoothed(x: i32, y: i32, seed: i32) -> f64 {
    let corners = (lattice(x - 1, y - 1, seed)
        + lattice(x + 1, y - 1, seed)
        + lattice(x - 1, y + 1, seed)
        + lattice(x + 1, y + 1, seed))
        / 16.0;
    let sides = (lattice(x - 1, y, seed)
        + lattice(x + 1, y, seed)
        + lattice(x, y - 1, seed)
        + lattice(x, y + 1, seed))
        / 8.0;
    corners + sides + lattice(x, y, seed) / 4.0
}

fn cosine_lerp(a: f64, b: f64, t: f64) -> f64 {
    let f = (1.0 - (t * PI).cos()) * 0.5;
    a * (1.0 - f) + b * f
}

fn interpolated(x: f64, y: f64, seed: i32) -> f64 {
    let (ix, iy) = (x.floor(), y.floor());
    let (fx, fy) = (x - ix, y - iy);
    let (ix, iy) = (ix as i32, iy as i32);

    let top = cosine_lerp(smoothed(ix, iy, seed), smoothed(ix + 1, iy, seed), fx);
    let bottom = cosine_lerp(smoothed(ix, iy + 1, seed), smoothed(ix + 1, iy + 1, seed), fx);
    cosine_lerp(top, bottom, fy)
}
