//! Terminal presentation of buffer surfaces.
//!
//! Mounted surfaces are composited onto one fixed-size cell grid; each
//! `present` writes only the cells that changed since the previous one.
//! The presenter never interprets content, it only moves cells to the
//! terminal.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use anyhow::Result;
use crossterm::{cursor, execute, queue, style, terminal};

use crate::types::{Cell, CellChange, Color, NamedColor, Style};

use super::BufferSurface;

struct Mount {
    surface: Rc<RefCell<BufferSurface>>,
    x: u16,
    y: u16,
}

pub struct TerminalPresenter {
    width: u16,
    height: u16,
    mounts: Vec<Mount>,
    prev_grid: Option<Vec<Vec<Cell>>>,
}

impl TerminalPresenter {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            mounts: Vec::new(),
            prev_grid: None,
        }
    }

    /// Place a surface with its top-left corner at `(x, y)`. Later mounts
    /// paint over earlier ones; blank cells are transparent.
    pub fn mount(&mut self, surface: Rc<RefCell<BufferSurface>>, x: u16, y: u16) {
        self.mounts.push(Mount { surface, x, y });
    }

    /// Force the next `present` to redraw every cell.
    pub fn invalidate(&mut self) {
        self.prev_grid = None;
    }

    /// Composite all mounted surfaces onto one grid.
    pub fn compose(&self) -> Vec<Vec<Cell>> {
        let w = self.width as usize;
        let h = self.height as usize;
        let mut grid = vec![vec![Cell::default(); w]; h];
        let blank = Cell::default();

        for mount in &self.mounts {
            let cells = mount.surface.borrow().cells();
            for (row, line) in cells.iter().enumerate() {
                let y = mount.y as usize + row;
                if y >= h {
                    break;
                }
                for (col, cell) in line.iter().enumerate() {
                    let x = mount.x as usize + col;
                    if x >= w {
                        break;
                    }
                    if *cell != blank {
                        grid[y][x] = *cell;
                    }
                }
            }
        }

        grid
    }

    /// Write the current composite to `out`. The first frame (or the first
    /// after `invalidate`) is drawn in full, later ones as cell diffs.
    pub fn present(&mut self, out: &mut impl Write) -> Result<()> {
        let grid = self.compose();

        match &self.prev_grid {
            None => {
                for (y, row) in grid.iter().enumerate() {
                    queue!(out, cursor::MoveTo(0, y as u16))?;
                    for cell in row {
                        let cs = to_content_style(&cell.style);
                        queue!(out, style::PrintStyledContent(style::StyledContent::new(cs, cell.ch)))?;
                    }
                }
            }
            Some(prev) => {
                for change in diff(prev, &grid) {
                    let cs = to_content_style(&change.cell.style);
                    queue!(
                        out,
                        cursor::MoveTo(change.x, change.y),
                        style::PrintStyledContent(style::StyledContent::new(cs, change.cell.ch)),
                    )?;
                }
            }
        }
        out.flush()?;

        self.prev_grid = Some(grid);
        Ok(())
    }

    /// Switch the terminal into raw alternate-screen mode.
    pub fn enter(out: &mut impl Write) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;
        Ok(())
    }

    /// Restore the terminal. Errors are ignored so this is safe on any exit
    /// path.
    pub fn leave(out: &mut impl Write) {
        let _ = execute!(out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Compute a cell-level diff between two grids.
pub fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
    let mut changes = Vec::new();
    for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
        for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
            if prev_cell != next_cell {
                changes.push(CellChange {
                    x: x as u16,
                    y: y as u16,
                    cell: *next_cell,
                });
            }
        }
    }
    changes
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &s.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if let Some(bg) = &s.bg {
        cs.background_color = Some(to_ct_color(bg));
    }
    if s.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    if s.dim {
        cs.attributes.set(style::Attribute::Dim);
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb {
            r: *r,
            g: *g,
            b: *b,
        },
    }
}
