use serde::{Deserialize, Serialize};

use crate::error::FxError;

use super::{DEFAULT_SEED, Effect, EffectContext, EffectOutput, Rng};

const DEFAULT_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789@#$%^&*";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixRainConfig {
    pub charset: String,
    /// Rows advanced per frame by the fastest column.
    pub speed: f64,
    /// Rows of flicker behind each head.
    pub trail: usize,
    pub seed: u32,
}

impl Default for MatrixRainConfig {
    fn default() -> Self {
        Self {
            charset: DEFAULT_CHARSET.into(),
            speed: 0.05,
            trail: 5,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone)]
struct Column {
    y: f64,
    speed: f64,
}

/// Falling columns of random glyphs over the text.
///
/// Columns are laid out on the first frame from the width of the first line
/// and keep falling across frames; a column that leaves the bottom restarts
/// above the top.
pub struct MatrixRain {
    charset: Vec<char>,
    speed: f64,
    trail: f64,
    rng: Rng,
    seed: u32,
    columns: Vec<Column>,
    initialized: bool,
}

impl MatrixRain {
    pub fn new(config: MatrixRainConfig) -> Self {
        let mut charset: Vec<char> = config.charset.chars().collect();
        if charset.is_empty() {
            charset = DEFAULT_CHARSET.chars().collect();
        }
        Self {
            charset,
            speed: config.speed,
            trail: config.trail as f64,
            rng: Rng::new(config.seed),
            seed: config.seed,
            columns: Vec::new(),
            initialized: false,
        }
    }

    fn init_columns(&mut self, width: usize) {
        self.columns = (0..width)
            .map(|_| Column {
                y: -self.rng.next_f64() * 20.0,
                speed: 0.5 + self.rng.next_f64() * 0.5,
            })
            .collect();
        self.initialized = true;
    }
}

impl Effect for MatrixRain {
    fn name(&self) -> &str {
        "matrix_rain"
    }

    fn render(
        &mut self,
        text: &str,
        _elapsed: f64,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<EffectOutput, FxError> {
        let lines: Vec<&str> = text.split('\n').collect();
        if !self.initialized {
            let width = lines.first().map(|l| l.chars().count()).unwrap_or(0);
            self.init_columns(width);
        }

        let height = lines.len() as f64;
        for column in &mut self.columns {
            column.y += self.speed * column.speed;
            if column.y > height {
                column.y = -self.rng.next_f64() * 10.0;
            }
        }

        let mut out = Vec::with_capacity(lines.len());
        for (row, line) in lines.iter().enumerate() {
            let row = row as f64;
            let mut rendered = String::with_capacity(line.len());
            for (col, ch) in line.chars().enumerate() {
                let Some(column) = self.columns.get(col) else {
                    rendered.push(ch);
                    continue;
                };
                let head = column.y;
                if (row - head).abs() < 1.0 {
                    rendered.push(self.rng.pick(&self.charset));
                } else if row > head && row < head + self.trail && self.rng.next_f64() < 0.3 {
                    rendered.push(self.rng.pick(&self.charset));
                } else {
                    rendered.push(ch);
                }
            }
            out.push(rendered);
        }

        Ok(EffectOutput::Plain(out.join("\n")))
    }

    fn release(&mut self) {
        self.columns.clear();
        self.initialized = false;
        self.rng = Rng::new(self.seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::BufferSurface;
    use crate::types::Extent;

    #[test]
    fn keeps_shape_and_initializes_once() {
        let mut rain = MatrixRain::new(MatrixRainConfig {
            speed: 5.0,
            ..MatrixRainConfig::default()
        });
        let mut surface = BufferSurface::new(Extent::new(4, 3));
        let text = "abcd\nefgh\nijkl";
        let mut ctx = EffectContext {
            original: text,
            surface: &mut surface,
        };

        for _ in 0..20 {
            let out = rain.render(text, 0.0, &mut ctx).unwrap();
            let lines: Vec<&str> = out.text().split('\n').collect();
            assert_eq!(lines.len(), 3);
            assert!(lines.iter().all(|l| l.chars().count() == 4));
        }
        assert_eq!(rain.columns.len(), 4);

        rain.release();
        assert!(!rain.initialized);
        assert!(rain.columns.is_empty());
    }
}
