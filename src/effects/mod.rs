//! Effects: the transform stages of an instance's chain.
//!
//! Each built-in effect lives in its own module with its config struct and
//! `Effect` implementation side by side. `catalog` maps effect names to
//! factories so callers can build effects from JSON config.

pub mod catalog;
mod color_cycle;
mod color_gradient;
mod glitch;
mod matrix_rain;
mod reveal;
mod scanlines;
mod scramble;
mod typewriter;
mod wave;

pub use catalog::{EffectCatalog, EffectFactory};
pub use color_cycle::{ColorCycle, ColorCycleConfig};
pub use color_gradient::{ColorGradient, ColorGradientConfig, GradientMode};
pub use glitch::{Glitch, GlitchConfig};
pub use matrix_rain::{MatrixRain, MatrixRainConfig};
pub use reveal::{Reveal, RevealConfig};
pub use scanlines::{Scanlines, ScanlinesConfig};
pub use scramble::{RevealMode, Scramble, ScrambleConfig};
pub use typewriter::{Typewriter, TypewriterConfig};
pub use wave::{Wave, WaveConfig};

use crate::error::FxError;
use crate::surface::Surface;
use crate::types::StyledText;

/// Duration assumed by progress-based effects that were not given one.
pub const DEFAULT_DURATION: f64 = 1000.0;

/// What an effect sees besides its input text.
pub struct EffectContext<'a> {
    /// The instance's unmodified payload.
    pub original: &'a str,
    pub surface: &'a mut dyn Surface,
}

/// A rich result: styled cells for the surface plus the plain text the
/// next effect in the chain receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichText {
    pub text: String,
    pub styled: StyledText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutput {
    Plain(String),
    Rich(RichText),
}

impl EffectOutput {
    /// The text handed to the next effect.
    pub fn text(&self) -> &str {
        match self {
            EffectOutput::Plain(text) => text,
            EffectOutput::Rich(rich) => &rich.text,
        }
    }
}

impl From<String> for EffectOutput {
    fn from(text: String) -> Self {
        EffectOutput::Plain(text)
    }
}

impl From<&str> for EffectOutput {
    fn from(text: &str) -> Self {
        EffectOutput::Plain(text.to_string())
    }
}

impl From<RichText> for EffectOutput {
    fn from(rich: RichText) -> Self {
        EffectOutput::Rich(rich)
    }
}

pub trait Effect {
    fn name(&self) -> &str;

    /// Transform `text` for a frame `elapsed` ms after the owning instance
    /// started.
    fn render(
        &mut self,
        text: &str,
        elapsed: f64,
        ctx: &mut EffectContext<'_>,
    ) -> Result<EffectOutput, FxError>;

    fn duration(&self) -> f64 {
        DEFAULT_DURATION
    }

    /// Called when the effect is removed from a chain.
    fn release(&mut self) {}
}

/// An effect backed by a closure.
pub struct FnEffect<F> {
    name: String,
    f: F,
}

impl<F> Effect for FnEffect<F>
where
    F: FnMut(&str, f64, &mut EffectContext<'_>) -> EffectOutput,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn render(
        &mut self,
        text: &str,
        elapsed: f64,
        ctx: &mut EffectContext<'_>,
    ) -> Result<EffectOutput, FxError> {
        Ok((self.f)(text, elapsed, ctx))
    }
}

/// Wrap a closure as an effect.
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnEffect<F>
where
    F: FnMut(&str, f64, &mut EffectContext<'_>) -> EffectOutput,
{
    FnEffect {
        name: name.into(),
        f,
    }
}

// ---------------------------------------------------------------------------
// Xorshift32 RNG
// ---------------------------------------------------------------------------

pub(crate) const DEFAULT_SEED: u32 = 0x9E37_79B9;

/// Deterministic xorshift32 PRNG. Effects that look random seed one each so
/// a given seed always replays the same frames.
#[derive(Debug, Clone)]
pub(crate) struct Rng {
    state: u32,
}

impl Rng {
    pub(crate) fn new(seed: u32) -> Self {
        // Zero is a fixed point of xorshift.
        Self { state: seed | 1 }
    }

    #[inline]
    pub(crate) fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform in [0, 1).
    #[inline]
    pub(crate) fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    /// Uniform index in `0..n`; `n` must be non-zero.
    #[inline]
    pub(crate) fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize
    }

    pub(crate) fn pick(&mut self, chars: &[char]) -> char {
        if chars.is_empty() {
            return ' ';
        }
        chars[self.below(chars.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_never_yields_zero() {
        let mut rng = Rng::new(0);
        for _ in 0..1000 {
            assert_ne!(rng.next_u32(), 0);
        }
    }

    #[test]
    fn rng_is_deterministic() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn rng_ranges() {
        let mut rng = Rng::new(7);
        for _ in 0..1000 {
            let f = rng.next_f64();
            assert!((0.0..1.0).contains(&f));
            assert!(rng.below(3) < 3);
        }
    }

    #[test]
    fn output_text_projection() {
        let plain = EffectOutput::from("abc");
        assert_eq!(plain.text(), "abc");
        let rich = EffectOutput::from(RichText {
            text: "xy".into(),
            styled: StyledText::from_plain("xy"),
        });
        assert_eq!(rich.text(), "xy");
    }
}
