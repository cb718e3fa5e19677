use serde::{Deserialize, Serialize};

use crate::core::timing::Easing;
use crate::error::FxError;

use super::{DEFAULT_DURATION, DEFAULT_SEED, Effect, EffectContext, EffectOutput, Rng};

const DEFAULT_CHARSET: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?/~`";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealMode {
    /// Resolve left to right.
    #[default]
    Progressive,
    /// Each character resolves independently with probability = progress.
    Random,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrambleConfig {
    pub duration: f64,
    pub charset: String,
    pub reveal_mode: RevealMode,
    pub easing: Easing,
    pub seed: u32,
}

impl Default for ScrambleConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            charset: DEFAULT_CHARSET.into(),
            reveal_mode: RevealMode::Progressive,
            easing: Easing::EaseOutQuad,
            seed: DEFAULT_SEED,
        }
    }
}

/// Random character replacement that settles into the real text.
pub struct Scramble {
    duration: f64,
    charset: Vec<char>,
    reveal_mode: RevealMode,
    easing: Easing,
    rng: Rng,
}

impl Scramble {
    pub fn new(config: ScrambleConfig) -> Self {
        let mut charset: Vec<char> = config.charset.chars().collect();
        if charset.is_empty() {
            charset = DEFAULT_CHARSET.chars().collect();
        }
        Self {
            duration: config.duration,
            charset,
            reveal_mode: config.reveal_mode,
            easing: config.easing,
            rng: Rng::new(config.seed),
        }
    }
}

impl Effect for Scramble {
    fn name(&self) -> &str {
        "scramble"
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn render(
        &mut self,
        text: &str,
        elapsed: f64,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<EffectOutput, FxError> {
        let progress = self.easing.progress(elapsed, self.duration);
        let total = text.chars().count();
        let revealed = (total as f64 * progress).floor() as usize;

        let mut out = String::with_capacity(text.len());
        for (i, ch) in text.chars().enumerate() {
            if ch == ' ' || ch == '\n' {
                out.push(ch);
                continue;
            }
            let settled = match self.reveal_mode {
                RevealMode::Progressive => i < revealed,
                RevealMode::Random => self.rng.next_f64() < progress,
            };
            if settled {
                out.push(ch);
            } else {
                out.push(self.rng.pick(&self.charset));
            }
        }

        Ok(EffectOutput::Plain(out))
    }
}
