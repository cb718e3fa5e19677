//! Effect chain composition.
//!
//! A chain folds its effects left to right over a payload. Plain results
//! replace the payload. Rich results replace the payload with their plain
//! projection and become the pending surface write; the most recent rich
//! result of a frame wins, and a later plain result does not cancel it.

use std::fmt;

use crate::effects::{Effect, EffectContext, EffectOutput};
use crate::error::FxError;
use crate::surface::Surface;
use crate::types::StyledText;

/// Result of folding a chain for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    /// Plain payload after the last effect.
    pub text: String,
    /// Structured form of the most recent rich result, if any effect
    /// produced one.
    pub styled: Option<StyledText>,
}

#[derive(Default)]
pub struct EffectChain {
    effects: Vec<Box<dyn Effect>>,
}

impl EffectChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: Box<dyn Effect>) {
        tracing::debug!(effect = effect.name(), position = self.effects.len(), "Effect appended");
        self.effects.push(effect);
    }

    /// Release every effect and empty the chain.
    pub fn clear(&mut self) {
        for mut effect in self.effects.drain(..) {
            effect.release();
        }
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.effects.iter().map(|e| e.name()).collect()
    }

    /// Fold the chain over `original`. Every effect sees the same `elapsed`.
    /// The first failing effect aborts the fold.
    pub fn apply(
        &mut self,
        original: &str,
        elapsed: f64,
        surface: &mut dyn Surface,
    ) -> Result<Composition, FxError> {
        let mut text = original.to_string();
        let mut styled = None;

        for effect in &mut self.effects {
            let mut ctx = EffectContext {
                original,
                surface: &mut *surface,
            };
            match effect.render(&text, elapsed, &mut ctx)? {
                EffectOutput::Plain(next) => text = next,
                EffectOutput::Rich(rich) => {
                    text = rich.text;
                    styled = Some(rich.styled);
                }
            }
        }

        Ok(Composition { text, styled })
    }
}

impl fmt::Debug for EffectChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
