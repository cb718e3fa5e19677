use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::FxError;
use crate::types::{Cell, Color, Style, StyledText};

use super::{Effect, EffectContext, EffectOutput, RichText};

/// Which HSL channel the gradient walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientMode {
    #[default]
    Lightness,
    Saturation,
    Both,
    HueShift,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGradientConfig {
    pub base_color: Color,
    /// Gradient cycles per millisecond.
    pub speed: f64,
    pub mode: GradientMode,
}

impl Default for ColorGradientConfig {
    fn default() -> Self {
        Self {
            base_color: Color::Rgb { r: 0, g: 170, b: 255 },
            speed: 0.001,
            mode: GradientMode::Lightness,
        }
    }
}

/// Shades of a single base color spread across the glyphs and drifting
/// over time.
pub struct ColorGradient {
    config: ColorGradientConfig,
    base: (f64, f64, f64),
}

impl ColorGradient {
    pub fn new(config: ColorGradientConfig) -> Self {
        let base = config.base_color.to_hsl();
        Self { config, base }
    }

    fn shade(&self, position: f64) -> Color {
        let (h, s, l) = self.base;
        let phase = position.rem_euclid(1.0);
        // Greys have no hue to vary, so those modes sweep the hue wheel.
        let grey = s < 5.0;
        let wave = |f: fn(f64) -> f64| f(position * TAU) * 0.5 + 0.5;

        let (h, s, l) = match self.config.mode {
            GradientMode::Lightness => (h, s, 20.0 + phase * 60.0),
            GradientMode::Saturation if grey => (phase * 360.0, 30.0 + phase * 70.0, l),
            GradientMode::Saturation => (h, 30.0 + phase * 70.0, l),
            GradientMode::Both => {
                let hue = if grey { phase * 360.0 } else { h };
                (hue, 40.0 + wave(f64::cos) * 60.0, 30.0 + wave(f64::sin) * 50.0)
            }
            GradientMode::HueShift => (h + phase * 60.0 - 30.0, s, l),
        };
        Color::from_hsl(h, s, l)
    }
}

impl Effect for ColorGradient {
    fn name(&self) -> &str {
        "color_gradient"
    }

    fn render(
        &mut self,
        text: &str,
        elapsed: f64,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<EffectOutput, FxError> {
        let time = elapsed * self.config.speed;
        let total = text.chars().filter(|c| !c.is_whitespace()).count().max(1) as f64;
        let mut glyph = 0usize;

        let lines = text
            .split('\n')
            .map(|line| {
                line.chars()
                    .map(|ch| {
                        if ch.is_whitespace() {
                            return Cell::plain(ch);
                        }
                        let color = self.shade(glyph as f64 / total + time);
                        glyph += 1;
                        Cell {
                            ch,
                            style: Style::fg(color),
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(EffectOutput::Rich(RichText {
            text: text.to_string(),
            styled: StyledText { lines },
        }))
    }
}
