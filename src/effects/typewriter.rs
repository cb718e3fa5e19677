use serde::{Deserialize, Serialize};

use crate::error::FxError;

use super::{Effect, EffectContext, EffectOutput};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    /// Milliseconds per character.
    pub speed: f64,
    pub cursor: String,
    pub show_cursor: bool,
    /// Cursor blink half-period in milliseconds.
    pub blink_speed: f64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            speed: 50.0,
            cursor: "|".into(),
            show_cursor: true,
            blink_speed: 500.0,
        }
    }
}

/// Terminal-style typing: reveals a growing prefix with a blinking cursor.
pub struct Typewriter {
    config: TypewriterConfig,
}

impl Typewriter {
    pub fn new(config: TypewriterConfig) -> Self {
        Self { config }
    }
}

impl Effect for Typewriter {
    fn name(&self) -> &str {
        "typewriter"
    }

    fn render(
        &mut self,
        text: &str,
        elapsed: f64,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<EffectOutput, FxError> {
        let total = text.chars().count();
        let typed = if self.config.speed > 0.0 {
            (elapsed.max(0.0) / self.config.speed).floor() as usize
        } else {
            total
        };

        let mut out: String = text.chars().take(typed.min(total)).collect();

        if self.config.show_cursor && typed < total {
            let blink = self.config.blink_speed <= 0.0
                || ((elapsed.max(0.0) / self.config.blink_speed).floor() as u64) % 2 == 0;
            if blink {
                out.push_str(&self.config.cursor);
            }
        }

        Ok(EffectOutput::Plain(out))
    }
}
