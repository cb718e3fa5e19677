//! Procedural character backgrounds.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FxError};
use crate::surface::SharedSurface;
use crate::types::{Extent, Offset};

use super::{Animated, BaseInstance};

const DEFAULT_CHARSET: &str = " .:-=+*#%@";
const FALLBACK_COLS: u16 = 80;
const FALLBACK_ROWS: u16 = 40;

/// Maps a cell `(x, y)` at engine time `time` (ms) to a density in `[0, 1]`.
/// Values outside that range are clamped.
pub type Generator = Box<dyn FnMut(usize, usize, f64) -> f64>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasGridConfig {
    /// Defaults to the surface width.
    pub cols: Option<u16>,
    /// Defaults to the surface height.
    pub rows: Option<u16>,
    /// Glyphs from sparse to dense.
    pub charset: String,
}

impl Default for CanvasGridConfig {
    fn default() -> Self {
        Self {
            cols: None,
            rows: None,
            charset: DEFAULT_CHARSET.into(),
        }
    }
}

fn default_generator(x: usize, y: usize, time: f64) -> f64 {
    let noise = (x as f64 * 0.1 + time * 0.001).sin() * (y as f64 * 0.1 + time * 0.001).cos();
    (noise + 1.0) / 2.0
}

pub struct CanvasGrid {
    base: BaseInstance,
    extent: Extent,
    charset: Vec<char>,
    generator: Generator,
    frame: String,
}

impl CanvasGrid {
    pub fn new(
        id: impl Into<String>,
        surface: SharedSurface,
        config: CanvasGridConfig,
    ) -> Result<Self, FxError> {
        let base = BaseInstance::new(id, surface);
        let available = base
            .surface()
            .try_borrow()
            .map_err(|_| FxError::SurfaceBusy {
                id: base.id().to_string(),
            })?
            .extent();

        let or_surface = |value: u16, fallback: u16| if value == 0 { fallback } else { value };
        let cols = config.cols.unwrap_or(or_surface(available.cols, FALLBACK_COLS));
        let rows = config.rows.unwrap_or(or_surface(available.rows, FALLBACK_ROWS));
        let extent = Extent::new(cols, rows);
        if extent.is_empty() {
            return Err(ConfigError::InvalidGrid { cols, rows }.into());
        }

        let charset = parse_charset(&config.charset)?;
        tracing::debug!(instance = base.id(), cols, rows, "Canvas grid created");

        Ok(Self {
            base,
            extent,
            charset,
            generator: Box::new(default_generator),
            frame: String::new(),
        })
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// The last generated frame, before effects.
    pub fn frame(&self) -> &str {
        &self.frame
    }

    pub fn set_generator<F>(&mut self, generator: F)
    where
        F: FnMut(usize, usize, f64) -> f64 + 'static,
    {
        self.generator = Box::new(generator);
    }

    pub fn set_charset(&mut self, charset: &str) -> Result<(), FxError> {
        self.charset = parse_charset(charset)?;
        Ok(())
    }

    fn value_to_char(&self, value: f64) -> char {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        let index = (value * (self.charset.len() - 1) as f64).floor() as usize;
        self.charset.get(index).copied().unwrap_or(' ')
    }

    fn generate(&mut self, time: f64) {
        let cols = self.extent.cols as usize;
        let rows = self.extent.rows as usize;
        let mut frame = String::with_capacity((cols + 1) * rows);
        for y in 0..rows {
            if y > 0 {
                frame.push('\n');
            }
            for x in 0..cols {
                let value = (self.generator)(x, y, time);
                frame.push(self.value_to_char(value));
            }
        }
        self.frame = frame;
    }
}

fn parse_charset(charset: &str) -> Result<Vec<char>, FxError> {
    let chars: Vec<char> = charset.chars().collect();
    if chars.is_empty() {
        return Err(ConfigError::EmptyCharset.into());
    }
    Ok(chars)
}

impl Animated for CanvasGrid {
    fn base(&self) -> &BaseInstance {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseInstance {
        &mut self.base
    }

    fn render(&mut self, time: f64, _delta: f64) -> Result<(), FxError> {
        self.generate(time);

        let elapsed = self.base.elapsed(time);
        let surface = Rc::clone(self.base.surface());
        let mut surface = surface.try_borrow_mut().map_err(|_| FxError::SurfaceBusy {
            id: self.base.id().to_string(),
        })?;

        let composition = self
            .base
            .effects_mut()
            .apply(&self.frame, elapsed, &mut *surface)?;
        match composition.styled {
            Some(styled) => surface.set_styled(&styled),
            None => {
                let lines: Vec<&str> = composition.text.split('\n').collect();
                surface.draw_glyphs(&lines, self.extent);
            }
        }
        Ok(())
    }

    /// Release the effects and put the last generated frame back, unstyled.
    fn clear_effects(&mut self) {
        self.base.effects_mut().clear();

        let surface = Rc::clone(self.base.surface());
        let Ok(mut surface) = surface.try_borrow_mut() else {
            tracing::warn!(instance = self.base.id(), "Surface busy, frame not restored");
            return;
        };
        surface.set_offset(Offset::ZERO);
        if !self.frame.is_empty() {
            let lines: Vec<&str> = self.frame.split('\n').collect();
            surface.draw_glyphs(&lines, self.extent);
        }
    }
}

impl fmt::Debug for CanvasGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasGrid")
            .field("base", &self.base)
            .field("extent", &self.extent)
            .field("charset", &self.charset.iter().collect::<String>())
            .finish_non_exhaustive()
    }
}
