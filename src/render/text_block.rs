//! Text and ASCII-art blocks.
//!
//! A `TextBlock` takes its original payload from the surface it is given,
//! folds its effect chain over that payload every frame and writes the
//! result back. Large pieces of art (more than `threshold` lines) switch to
//! glyph mode: the surface is drawn as a fixed grid sized from the original
//! text instead of having its text replaced.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::effects::Effect;
use crate::error::FxError;
use crate::surface::{SharedSurface, Surface};
use crate::types::{Extent, Offset};

use super::{Animated, BaseInstance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Auto,
    Text,
    Glyph,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBlockConfig {
    pub render_mode: RenderMode,
    /// Line count above which `auto` picks glyph mode.
    pub threshold: usize,
}

impl Default for TextBlockConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Auto,
            threshold: 100,
        }
    }
}

pub struct TextBlock {
    base: BaseInstance,
    original: String,
    current: String,
    glyph_extent: Option<Extent>,
}

impl TextBlock {
    pub fn new(
        id: impl Into<String>,
        surface: SharedSurface,
        config: TextBlockConfig,
    ) -> Result<Self, FxError> {
        let base = BaseInstance::new(id, surface);
        let original = base
            .surface()
            .try_borrow()
            .map_err(|_| FxError::SurfaceBusy {
                id: base.id().to_string(),
            })?
            .text_content();

        let line_count = original.split('\n').count();
        let glyph = match config.render_mode {
            RenderMode::Auto => line_count > config.threshold,
            RenderMode::Text => false,
            RenderMode::Glyph => true,
        };
        let glyph_extent = glyph.then(|| Extent::of_text(&original));
        tracing::debug!(
            instance = base.id(),
            lines = line_count,
            glyph,
            "Text block created"
        );

        Ok(Self {
            base,
            current: original.clone(),
            original,
            glyph_extent,
        })
    }

    /// Add an effect. With `replace` the chain is cleared first, which also
    /// restores the original text on the surface.
    pub fn use_effect(&mut self, effect: Box<dyn Effect>, replace: bool) {
        if replace {
            self.clear_effects();
        }
        self.base.effects_mut().push(effect);
    }

    /// Stop and drop every effect.
    pub fn reset(&mut self) {
        self.stop();
        self.clear_effects();
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// The payload produced by the last frame.
    pub fn text(&self) -> &str {
        &self.current
    }

    /// Replace the payload and write it to the surface right away. In glyph
    /// mode the grid is resized to the new text.
    pub fn set_text(&mut self, text: &str) -> Result<(), FxError> {
        self.original = text.to_string();
        self.current = text.to_string();
        if self.glyph_extent.is_some() {
            self.glyph_extent = Some(Extent::of_text(text));
        }
        let surface = Rc::clone(self.base.surface());
        let mut surface = surface.try_borrow_mut().map_err(|_| self.surface_busy())?;
        self.write(&mut *surface);
        Ok(())
    }

    pub fn is_glyph_mode(&self) -> bool {
        self.glyph_extent.is_some()
    }

    fn write(&self, surface: &mut dyn Surface) {
        match self.glyph_extent {
            Some(extent) => {
                let lines: Vec<&str> = self.current.split('\n').collect();
                surface.draw_glyphs(&lines, extent);
            }
            None => surface.set_text(&self.current),
        }
    }

    fn surface_busy(&self) -> FxError {
        FxError::SurfaceBusy {
            id: self.base.id().to_string(),
        }
    }
}

impl Animated for TextBlock {
    fn base(&self) -> &BaseInstance {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseInstance {
        &mut self.base
    }

    fn render(&mut self, time: f64, _delta: f64) -> Result<(), FxError> {
        let elapsed = self.base.elapsed(time);
        let surface = Rc::clone(self.base.surface());
        let mut surface = surface.try_borrow_mut().map_err(|_| self.surface_busy())?;

        let composition = self
            .base
            .effects_mut()
            .apply(&self.original, elapsed, &mut *surface)?;
        self.current = composition.text;

        match composition.styled {
            Some(styled) => surface.set_styled(&styled),
            None => self.write(&mut *surface),
        }
        Ok(())
    }

    fn clear_effects(&mut self) {
        self.base.effects_mut().clear();
        self.current = self.original.clone();

        let surface = Rc::clone(self.base.surface());
        let Ok(mut surface) = surface.try_borrow_mut() else {
            tracing::warn!(instance = self.base.id(), "Surface busy, original text not restored");
            return;
        };
        surface.set_offset(Offset::ZERO);
        self.write(&mut *surface);
    }
}
