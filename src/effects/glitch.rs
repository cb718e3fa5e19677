use serde::{Deserialize, Serialize};

use crate::error::FxError;
use crate::types::Offset;

use super::{DEFAULT_SEED, Effect, EffectContext, EffectOutput, Rng};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchConfig {
    /// Probability (per line, per character) of a disturbance.
    pub intensity: f64,
    /// Maximum horizontal line shift in columns.
    pub offset_range: u16,
    pub corrupt_chars: String,
    pub seed: u32,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            intensity: 0.1,
            offset_range: 5,
            corrupt_chars: "▓▒░█▀▄".into(),
            seed: DEFAULT_SEED,
        }
    }
}

/// Digital corruption: random line shifts, block-character noise and an
/// occasional one-cell jitter of the whole surface.
pub struct Glitch {
    intensity: f64,
    offset_range: i64,
    corrupt_chars: Vec<char>,
    rng: Rng,
}

impl Glitch {
    pub fn new(config: GlitchConfig) -> Self {
        Self {
            intensity: config.intensity.clamp(0.0, 1.0),
            offset_range: config.offset_range as i64,
            corrupt_chars: config.corrupt_chars.chars().collect(),
            rng: Rng::new(config.seed),
        }
    }

    fn jitter(&mut self) -> i16 {
        self.rng.below(3) as i16 - 1
    }
}

impl Effect for Glitch {
    fn name(&self) -> &str {
        "glitch"
    }

    fn render(
        &mut self,
        text: &str,
        _elapsed: f64,
        ctx: &mut EffectContext<'_>,
    ) -> Result<EffectOutput, FxError> {
        let mut lines = Vec::new();

        for line in text.split('\n') {
            let mut out = String::with_capacity(line.len());

            if self.rng.next_f64() < self.intensity {
                let span = (self.offset_range * 2).max(1) as usize;
                let shift = self.rng.below(span) as i64 - self.offset_range;
                if shift > 0 {
                    out.push_str(&" ".repeat(shift as usize));
                }
            }

            for ch in line.chars() {
                if ch != ' ' && self.rng.next_f64() < self.intensity && !self.corrupt_chars.is_empty() {
                    out.push(self.rng.pick(&self.corrupt_chars));
                } else {
                    out.push(ch);
                }
            }
            lines.push(out);
        }

        if self.rng.next_f64() < self.intensity * 0.5 {
            let offset = Offset::new(self.jitter(), self.jitter());
            ctx.surface.set_offset(offset);
        } else {
            ctx.surface.set_offset(Offset::ZERO);
        }

        Ok(EffectOutput::Plain(lines.join("\n")))
    }
}
