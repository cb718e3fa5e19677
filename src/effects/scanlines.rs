use serde::{Deserialize, Serialize};

use crate::error::FxError;
use crate::types::{Cell, Style, StyledText};

use super::{Effect, EffectContext, EffectOutput, RichText};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanlinesConfig {
    /// Every `line_height`-th row is dimmed.
    pub line_height: usize,
    /// Seconds for the dimmed rows to scroll down by one band.
    pub speed: f64,
}

impl Default for ScanlinesConfig {
    fn default() -> Self {
        Self {
            line_height: 2,
            speed: 0.5,
        }
    }
}

/// CRT-style scanlines: dimmed rows drifting downwards.
///
/// Rich result. It restyles the whole payload, so put it last when combined
/// with other rich effects.
pub struct Scanlines {
    config: ScanlinesConfig,
}

impl Scanlines {
    pub fn new(config: ScanlinesConfig) -> Self {
        Self { config }
    }
}

impl Effect for Scanlines {
    fn name(&self) -> &str {
        "scanlines"
    }

    fn render(
        &mut self,
        text: &str,
        elapsed: f64,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<EffectOutput, FxError> {
        let band = self.config.line_height.max(1);
        let period = self.config.speed * 1000.0;
        let scroll = if period > 0.0 {
            (elapsed / period).floor().max(0.0) as usize % band
        } else {
            0
        };

        let dim = Style {
            dim: true,
            ..Style::default()
        };
        let lines = text
            .split('\n')
            .enumerate()
            .map(|(row, line)| {
                let style = if (row + band - scroll) % band == 0 {
                    dim
                } else {
                    Style::default()
                };
                line.chars().map(|ch| Cell { ch, style }).collect()
            })
            .collect();

        Ok(EffectOutput::Rich(RichText {
            text: text.to_string(),
            styled: StyledText { lines },
        }))
    }
}
