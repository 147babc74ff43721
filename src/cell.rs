//! Display cell representation
//!
//! Each cell in the display grid contains:
//! - A single symbol (Unicode scalar value)
//! - Foreground/background color references
//! - Style attributes (bold, underline, reverse, etc.)
//! - A display width of 1 or 2 columns (0 marks a wide-character continuation)

use serde::{Deserialize, Serialize};

use crate::color::{Color, Rgb};

/// Maximum width of any character, in columns
pub const MAX_CHAR_WIDTH: u8 = 2;

/// Attributes that affect how a cell is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellAttributes {
    /// Bold text (SGR 1)
    pub bold: bool,
    /// Faint/dim text (SGR 2)
    pub faint: bool,
    /// Italic text (SGR 3)
    pub italic: bool,
    /// Underlined text (SGR 4)
    pub underline: bool,
    /// Blinking text (SGR 5)
    pub blink: bool,
    /// Reverse video (SGR 7)
    pub reverse: bool,
    /// Hidden/invisible text (SGR 8)
    pub hidden: bool,
    /// Strikethrough text (SGR 9)
    pub strikethrough: bool,
}

impl CellAttributes {
    /// Create new default attributes
    pub fn new() -> Self {
        Self::default()
    }
}

/// A single cell in the display grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// The symbol stored in this cell (space when blank)
    symbol: char,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Display attributes
    pub attrs: CellAttributes,
    /// Width of this cell (1 for normal, 2 for wide chars, 0 for continuation)
    width: u8,
}

impl Cell {
    /// Create a blank cell in default colors
    pub fn blank() -> Self {
        Self {
            symbol: ' ',
            fg: Color::Default,
            bg: Color::Default,
            attrs: CellAttributes::default(),
            width: 1,
        }
    }

    /// Create a cell with a character
    pub fn with_char(c: char) -> Self {
        Self::with_colors(c, Color::Default, Color::Default, CellAttributes::default())
    }

    /// Create a cell with a character, colors and attributes
    pub fn with_colors(c: char, fg: Color, bg: Color, attrs: CellAttributes) -> Self {
        Self {
            symbol: c,
            fg,
            bg,
            attrs,
            width: unicode_display_width(c),
        }
    }

    /// Create the second column of a wide character
    pub fn continuation(fg: Color, bg: Color, attrs: CellAttributes) -> Self {
        Self {
            symbol: ' ',
            fg,
            bg,
            attrs,
            width: 0,
        }
    }

    /// Get the symbol
    pub fn symbol(&self) -> char {
        self.symbol
    }

    /// Get the display width of this cell
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Check if this is a continuation cell
    pub fn is_continuation(&self) -> bool {
        self.width == 0
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

/// A cell with its colors resolved against a palette: exactly what a viewer
/// shows in that position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    pub symbol: char,
    pub width: u8,
    pub fg: Rgb,
    pub bg: Rgb,
    pub attrs: CellAttributes,
}

impl Glyph {
    /// A blank glyph in the given colors
    pub fn blank(fg: Rgb, bg: Rgb) -> Self {
        Self {
            symbol: ' ',
            width: 1,
            fg,
            bg,
            attrs: CellAttributes::default(),
        }
    }

    /// Whether two glyphs can share one draw call
    pub fn same_style(&self, other: &Glyph) -> bool {
        self.fg == other.fg && self.bg == other.bg && self.attrs == other.attrs
    }
}

/// Calculate the display width of a Unicode character
/// Returns 2 for wide characters (CJK, etc.), 1 for everything else
fn unicode_display_width(c: char) -> u8 {
    use unicode_width::UnicodeWidthChar;
    match c.width() {
        Some(w) if w >= 2 => MAX_CHAR_WIDTH,
        // Combining marks and control characters still occupy their cell
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_blank() {
        let cell = Cell::blank();
        assert_eq!(cell.symbol(), ' ');
        assert_eq!(cell.width(), 1);
        assert_eq!(cell, Cell::default());
    }

    #[test]
    fn test_cell_with_char() {
        let cell = Cell::with_char('A');
        assert_eq!(cell.symbol(), 'A');
        assert_eq!(cell.width(), 1);
    }

    #[test]
    fn test_cell_wide_char() {
        let cell = Cell::with_char('中');
        assert_eq!(cell.symbol(), '中');
        assert_eq!(cell.width(), 2);
    }

    #[test]
    fn test_combining_mark_takes_one_column() {
        assert_eq!(Cell::with_char('\u{301}').width(), 1);
    }

    #[test]
    fn test_continuation() {
        let cell = Cell::continuation(Color::Default, Color::Indexed(4), CellAttributes::new());
        assert!(cell.is_continuation());
        assert_eq!(cell.bg, Color::Indexed(4));
    }


    #[test]
    fn test_glyph_same_style() {
        let a = Glyph::blank(Rgb::WHITE, Rgb::BLACK);
        let mut b = a;
        b.symbol = 'x';
        assert!(a.same_style(&b));
        b.attrs.underline = true;
        assert!(!a.same_style(&b));
    }
}
