//! Surfaces: the opaque targets instances write their final payload to.
//!
//! The core only ever talks to a surface through the `Surface` trait. A
//! surface is owned by whoever constructed the instance; the instance holds
//! a shared handle.

pub mod buffer;
pub mod terminal;

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::{Extent, Offset, StyledText};

pub use buffer::{BufferSurface, Content};
pub use terminal::TerminalPresenter;

pub trait Surface {
    /// The plain text currently shown. Instances read their original payload
    /// from here at construction.
    fn text_content(&self) -> String;

    /// Replace the content with plain text.
    fn set_text(&mut self, text: &str);

    /// Replace the content with styled cells.
    fn set_styled(&mut self, styled: &StyledText);

    /// Draw lines as a fixed glyph grid of `extent`, clipping anything
    /// outside it.
    fn draw_glyphs(&mut self, lines: &[&str], extent: Extent);

    /// Displace the whole surface. Surfaces without a notion of transform
    /// ignore it.
    fn set_offset(&mut self, _offset: Offset) {}

    fn extent(&self) -> Extent;
}

pub type SharedSurface = Rc<RefCell<dyn Surface>>;
