//! In-memory surface.
//!
//! Remembers the last write and rasterizes it onto a cell grid on demand.
//! The terminal presenter composites these grids; tests inspect them
//! directly.

use crate::types::{Cell, Extent, Offset, StyledText};

use super::Surface;

/// The last thing written to a `BufferSurface`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Styled(StyledText),
    Glyphs { lines: Vec<String>, extent: Extent },
}

#[derive(Debug, Clone)]
pub struct BufferSurface {
    extent: Extent,
    content: Content,
    offset: Offset,
    writes: usize,
}

impl BufferSurface {
    /// An empty surface of the given size.
    pub fn new(extent: Extent) -> Self {
        Self {
            extent,
            content: Content::Text(String::new()),
            offset: Offset::ZERO,
            writes: 0,
        }
    }

    /// A surface pre-filled with `text` and sized to fit it.
    pub fn with_text(text: &str) -> Self {
        Self {
            extent: Extent::of_text(text),
            content: Content::Text(text.to_string()),
            offset: Offset::ZERO,
            writes: 0,
        }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// Number of content writes received so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn is_styled(&self) -> bool {
        matches!(self.content, Content::Styled(_))
    }

    /// Rasterize the current content onto a grid of `extent`, applying the
    /// offset. Cells pushed outside the grid are dropped.
    pub fn cells(&self) -> Vec<Vec<Cell>> {
        let w = self.extent.cols as usize;
        let h = self.extent.rows as usize;
        let mut grid = vec![vec![Cell::default(); w]; h];

        let mut put = |col: usize, row: usize, cell: Cell| {
            let x = col as i64 + self.offset.dx as i64;
            let y = row as i64 + self.offset.dy as i64;
            if x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h {
                grid[y as usize][x as usize] = cell;
            }
        };

        match &self.content {
            Content::Text(text) => {
                for (row, line) in text.split('\n').enumerate() {
                    for (col, ch) in line.chars().enumerate() {
                        put(col, row, Cell::plain(ch));
                    }
                }
            }
            Content::Styled(styled) => {
                for (row, cells) in styled.lines.iter().enumerate() {
                    for (col, cell) in cells.iter().enumerate() {
                        put(col, row, *cell);
                    }
                }
            }
            Content::Glyphs { lines, extent } => {
                let gw = extent.cols as usize;
                let gh = extent.rows as usize;
                for (row, line) in lines.iter().take(gh).enumerate() {
                    for (col, ch) in line.chars().take(gw).enumerate() {
                        put(col, row, Cell::plain(ch));
                    }
                }
            }
        }

        grid
    }
}

impl Surface for BufferSurface {
    fn text_content(&self) -> String {
        match &self.content {
            Content::Text(text) => text.clone(),
            Content::Styled(styled) => styled.to_plain(),
            Content::Glyphs { lines, .. } => lines.join("\n"),
        }
    }

    fn set_text(&mut self, text: &str) {
        self.content = Content::Text(text.to_string());
        self.writes += 1;
    }

    fn set_styled(&mut self, styled: &StyledText) {
        self.content = Content::Styled(styled.clone());
        self.writes += 1;
    }

    fn draw_glyphs(&mut self, lines: &[&str], extent: Extent) {
        self.content = Content::Glyphs {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            extent,
        };
        self.writes += 1;
    }

    fn set_offset(&mut self, offset: Offset) {
        self.offset = offset;
    }

    fn extent(&self) -> Extent {
        self.extent
    }
}
