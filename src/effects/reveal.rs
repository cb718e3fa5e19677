use serde::{Deserialize, Serialize};

use crate::core::timing::Easing;
use crate::error::FxError;

use super::{DEFAULT_DURATION, Effect, EffectContext, EffectOutput};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub duration: f64,
    pub placeholder: char,
    pub easing: Easing,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            placeholder: '█',
            easing: Easing::EaseOutCubic,
        }
    }
}

/// Sequential unveiling: characters past the revealed prefix are masked.
/// Whitespace is never masked so the layout stays put.
pub struct Reveal {
    config: RevealConfig,
}

impl Reveal {
    pub fn new(config: RevealConfig) -> Self {
        Self { config }
    }
}

impl Effect for Reveal {
    fn name(&self) -> &str {
        "reveal"
    }

    fn duration(&self) -> f64 {
        self.config.duration
    }

    fn render(
        &mut self,
        text: &str,
        elapsed: f64,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<EffectOutput, FxError> {
        let progress = self.config.easing.progress(elapsed, self.config.duration);
        let total = text.chars().count();
        let revealed = (total as f64 * progress).floor() as usize;

        let out = text
            .chars()
            .enumerate()
            .map(|(i, ch)| {
                if i < revealed || ch == ' ' || ch == '\n' {
                    ch
                } else {
                    self.config.placeholder
                }
            })
            .collect();

        Ok(EffectOutput::Plain(out))
    }
}
