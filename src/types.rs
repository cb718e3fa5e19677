//! Shared value types for the animation core.
//!
//! This module defines the data that crosses the core's boundaries:
//! - Effect → Instance: `StyledText`, the structured half of a rich result
//! - Instance → Surface: `Cell` grids, `Extent` and `Offset` geometry

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared style primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// Convert an HSL triple (hue in degrees, saturation and lightness in
    /// percent) to an RGB color.
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let h = hue.rem_euclid(360.0);
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let l = (lightness / 100.0).clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match (h / 60.0) as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Color::Rgb {
            r: to_u8(r),
            g: to_u8(g),
            b: to_u8(b),
        }
    }

    /// RGB components; named colors use their full-intensity values.
    pub fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Rgb { r, g, b } => (r, g, b),
            Color::Named(named) => match named {
                NamedColor::Black => (0, 0, 0),
                NamedColor::Red => (255, 0, 0),
                NamedColor::Green => (0, 255, 0),
                NamedColor::Yellow => (255, 255, 0),
                NamedColor::Blue => (0, 0, 255),
                NamedColor::Magenta => (255, 0, 255),
                NamedColor::Cyan => (0, 255, 255),
                NamedColor::White => (255, 255, 255),
            },
        }
    }

    /// Inverse of [`from_hsl`](Self::from_hsl): hue in degrees, saturation
    /// and lightness in percent.
    pub fn to_hsl(self) -> (f64, f64, f64) {
        let (r, g, b) = self.to_rgb();
        let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if max == min {
            return (0.0, 0.0, l * 100.0);
        }

        let d = max - min;
        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h * 60.0, s * 100.0, l * 100.0)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<Color>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dim: bool,
}

impl Style {
    pub fn fg(color: Color) -> Self {
        Style {
            fg: Some(color),
            ..Style::default()
        }
    }

    pub fn is_default(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && !self.bold && !self.dim
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ch: char,
    #[serde(default, skip_serializing_if = "Style::is_default")]
    pub style: Style,
}

impl Cell {
    pub fn plain(ch: char) -> Self {
        Cell {
            ch,
            style: Style::default(),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::plain(' ')
    }
}

// ---------------------------------------------------------------------------
// Structured (rich) payloads
// ---------------------------------------------------------------------------

/// Styled rows of cells, the structured form an effect hands to a surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledText {
    pub lines: Vec<Vec<Cell>>,
}

impl StyledText {
    /// Unstyled cells for every character of `text`, one row per line.
    pub fn from_plain(text: &str) -> Self {
        StyledText {
            lines: text
                .split('\n')
                .map(|line| line.chars().map(Cell::plain).collect())
                .collect(),
        }
    }

    /// Plain-text projection: the characters without their styles.
    pub fn to_plain(&self) -> String {
        self.lines
            .iter()
            .map(|row| row.iter().map(|c| c.ch).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Column/row size of a surface or payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extent {
    pub cols: u16,
    pub rows: u16,
}

impl Extent {
    pub fn new(cols: u16, rows: u16) -> Self {
        Extent { cols, rows }
    }

    /// Size of a text block: longest line (in chars) by line count.
    pub fn of_text(text: &str) -> Self {
        let rows = text.split('\n').count();
        let cols = text
            .split('\n')
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        Extent {
            cols: cols.min(u16::MAX as usize) as u16,
            rows: rows.min(u16::MAX as usize) as u16,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }
}

/// Whole-surface displacement in cells, the terminal analogue of a
/// translate transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub dx: i16,
    pub dy: i16,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0, dy: 0 };

    pub fn new(dx: i16, dy: i16) -> Self {
        Offset { dx, dy }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_primaries() {
        assert_eq!(Color::from_hsl(0.0, 100.0, 50.0), Color::Rgb { r: 255, g: 0, b: 0 });
        assert_eq!(Color::from_hsl(120.0, 100.0, 50.0), Color::Rgb { r: 0, g: 255, b: 0 });
        assert_eq!(Color::from_hsl(240.0, 100.0, 50.0), Color::Rgb { r: 0, g: 0, b: 255 });
        assert_eq!(Color::from_hsl(360.0, 100.0, 50.0), Color::Rgb { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn hsl_conversion_inverts() {
        let azure = Color::Rgb { r: 0, g: 170, b: 255 };
        let (h, s, l) = azure.to_hsl();
        assert!((h - 200.0).abs() < 0.5);
        assert!((s - 100.0).abs() < 1e-9);
        assert!((l - 50.0).abs() < 1e-9);
        assert_eq!(Color::from_hsl(h, s, l), azure);

        assert_eq!(Color::Named(NamedColor::White).to_hsl(), (0.0, 0.0, 100.0));
    }

    #[test]
    fn styled_plain_projection() {
        let styled = StyledText::from_plain("AB\nC");
        assert_eq!(styled.lines.len(), 2);
        assert_eq!(styled.to_plain(), "AB\nC");
    }

    #[test]
    fn extent_counts_chars_not_bytes() {
        assert_eq!(Extent::of_text("█▓\nabc"), Extent::new(3, 2));
        assert_eq!(Extent::of_text(""), Extent::new(0, 1));
    }
}
