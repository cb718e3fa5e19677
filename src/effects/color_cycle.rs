use serde::{Deserialize, Serialize};

use crate::error::FxError;
use crate::types::{Cell, Color, Style, StyledText};

use super::{Effect, EffectContext, EffectOutput, RichText};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorCycleConfig {
    /// Hue degrees per millisecond.
    pub speed: f64,
    /// Hue degrees between consecutive glyphs.
    pub spread: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Default for ColorCycleConfig {
    fn default() -> Self {
        Self {
            speed: 0.001,
            spread: 10.0,
            saturation: 70.0,
            lightness: 50.0,
        }
    }
}

/// Rainbow hue rotation across glyphs.
///
/// Produces a rich result: the text passes through unchanged, every non-space
/// glyph gets its own foreground color.
pub struct ColorCycle {
    config: ColorCycleConfig,
}

impl ColorCycle {
    pub fn new(config: ColorCycleConfig) -> Self {
        Self { config }
    }
}

impl Effect for ColorCycle {
    fn name(&self) -> &str {
        "color_cycle"
    }

    fn render(
        &mut self,
        text: &str,
        elapsed: f64,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<EffectOutput, FxError> {
        let base = elapsed * self.config.speed;
        let mut glyph = 0usize;

        let lines = text
            .split('\n')
            .map(|line| {
                line.chars()
                    .map(|ch| {
                        if ch == ' ' {
                            return Cell::plain(ch);
                        }
                        let hue = (base + glyph as f64 * self.config.spread).rem_euclid(360.0);
                        glyph += 1;
                        Cell {
                            ch,
                            style: Style::fg(Color::from_hsl(
                                hue,
                                self.config.saturation,
                                self.config.lightness,
                            )),
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
