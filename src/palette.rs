//! Color palette owned by a display
//!
//! 256 indexed entries, the immutable default foreground/background used to
//! resolve [`Color::Default`], and the glyph colors that the emulation engine
//! sets before writing the next cell.

use crate::cell::{Cell, CellAttributes, Glyph};
use crate::color::{standard_palette, Color, Rgb, PALETTE_SIZE};
use crate::error::{DisplayError, Result};

/// Indexed color table plus default and glyph colors
#[derive(Debug, Clone)]
pub struct Palette {
    colors: [Rgb; PALETTE_SIZE],
    /// Table restored by `reset`; the built-in table when `None`
    default_table: Option<Box<[Rgb; PALETTE_SIZE]>>,
    default_foreground: Rgb,
    default_background: Rgb,
    glyph_foreground: Color,
    glyph_background: Color,
}

impl Palette {
    /// Create a palette, optionally seeded from a caller-supplied table which
    /// the palette then owns for its lifetime.
    pub fn new(
        foreground: Rgb,
        background: Rgb,
        default_table: Option<Box<[Rgb; PALETTE_SIZE]>>,
    ) -> Self {
        let colors = match &default_table {
            Some(table) => **table,
            None => standard_palette(),
        };
        Self {
            colors,
            default_table,
            default_foreground: foreground,
            default_background: background,
            glyph_foreground: Color::Default,
            glyph_background: Color::Default,
        }
    }

    /// Validate a palette index coming from the emulation engine
    fn slot(index: i64) -> Result<usize> {
        usize::try_from(index)
            .ok()
            .filter(|&i| i < PALETTE_SIZE)
            .ok_or(DisplayError::InvalidIndex(index))
    }

    /// Replace the entry at `index`. Fails without mutation when the index
    /// is outside 0-255.
    pub fn assign(&mut self, index: i64, color: Rgb) -> Result<()> {
        let slot = Self::slot(index)?;
        self.colors[slot] = color;
        Ok(())
    }

    /// Read the entry at `index`
    pub fn lookup(&self, index: i64) -> Result<Rgb> {
        Self::slot(index).map(|slot| self.colors[slot])
    }

    /// Restore all 256 entries from the default table. Default and glyph
    /// colors are untouched.
    pub fn reset(&mut self) {
        self.colors = match &self.default_table {
            Some(table) => **table,
            None => standard_palette(),
        };
    }

    /// All 256 entries
    pub fn colors(&self) -> &[Rgb; PALETTE_SIZE] {
        &self.colors
    }

    pub fn default_foreground(&self) -> Rgb {
        self.default_foreground
    }

    pub fn default_background(&self) -> Rgb {
        self.default_background
    }

    /// Whether a caller-supplied default table is owned
    pub fn has_custom_defaults(&self) -> bool {
        self.default_table.is_some()
    }

    /// Glyph colors (foreground, background) for the next cell written
    pub fn glyph_colors(&self) -> (Color, Color) {
        (self.glyph_foreground, self.glyph_background)
    }

    pub fn set_glyph_colors(&mut self, foreground: Color, background: Color) {
        self.glyph_foreground = foreground;
        self.glyph_background = background;
    }

    /// Build a cell carrying the current glyph colors
    pub fn glyph_cell(&self, symbol: char, attrs: CellAttributes) -> Cell {
        Cell::with_colors(symbol, self.glyph_foreground, self.glyph_background, attrs)
    }

    /// Resolve a foreground color reference
    pub fn foreground(&self, color: Color) -> Rgb {
        match color {
            Color::Default => self.default_foreground,
            Color::Indexed(i) => self.colors[usize::from(i)],
            Color::Rgb(rgb) => rgb,
        }
    }

    /// Resolve a background color reference
    pub fn background(&self, color: Color) -> Rgb {
        match color {
            Color::Default => self.default_background,
            Color::Indexed(i) => self.colors[usize::from(i)],
            Color::Rgb(rgb) => rgb,
        }
    }

    /// Resolve a cell into the glyph a viewer actually sees
    pub fn resolve(&self, cell: &Cell) -> Glyph {
        let mut fg = self.foreground(cell.fg);
        let mut bg = self.background(cell.bg);
        if cell.attrs.reverse {
            std::mem::swap(&mut fg, &mut bg);
        }
        Glyph {
            symbol: cell.symbol(),
            width: cell.width(),
            fg,
            bg,
            attrs: cell.attrs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> Palette {
        Palette::new(Rgb::WHITE, Rgb::BLACK, None)
    }

    #[test]
    fn test_assign_and_lookup() {
        let mut p = palette();
        p.assign(42, Rgb::new(1, 2, 3)).unwrap();
        assert_eq!(p.lookup(42).unwrap(), Rgb::new(1, 2, 3));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut p = palette();
        let before = *p.colors();
        assert!(matches!(
            p.assign(-1, Rgb::WHITE),
            Err(DisplayError::InvalidIndex(-1))
        ));
        assert!(p.assign(256, Rgb::WHITE).is_err());
        assert!(p.lookup(-1).is_err());
        assert!(p.lookup(256).is_err());
        assert_eq!(*p.colors(), before);
    }

    #[test]
    fn test_reset_uses_builtin_table() {
        let mut p = palette();
        p.assign(1, Rgb::new(9, 9, 9)).unwrap();
        p.set_glyph_colors(Color::Indexed(3), Color::Indexed(4));
        p.reset();
        assert_eq!(p.lookup(1).unwrap(), Rgb::new(205, 0, 0));
        assert_eq!(p.glyph_colors(), (Color::Indexed(3), Color::Indexed(4)));
        assert_eq!(p.default_foreground(), Rgb::WHITE);
    }

    #[test]
    fn test_reset_uses_supplied_table() {
        let table = Box::new([Rgb::new(7, 7, 7); PALETTE_SIZE]);
        let mut p = Palette::new(Rgb::WHITE, Rgb::BLACK, Some(table));
        assert!(p.has_custom_defaults());
        assert_eq!(p.lookup(200).unwrap(), Rgb::new(7, 7, 7));
        p.assign(200, Rgb::WHITE).unwrap();
        p.reset();
        assert_eq!(p.lookup(200).unwrap(), Rgb::new(7, 7, 7));
    }

    #[test]
    fn test_resolve_reverse() {
        let p = palette();
        let mut cell = Cell::with_colors('x', Color::Indexed(1), Color::Default, CellAttributes::new());
        cell.attrs.reverse = true;
        let glyph = p.resolve(&cell);
        assert_eq!(glyph.fg, Rgb::BLACK);
        assert_eq!(glyph.bg, Rgb::new(205, 0, 0));
    }

    #[test]
    fn test_glyph_cell_uses_glyph_colors() {
        let mut p = palette();
        p.set_glyph_colors(Color::Indexed(2), Color::rgb(1, 1, 1));
        let cell = p.glyph_cell('g', CellAttributes::new());
        assert_eq!(cell.fg, Color::Indexed(2));
        assert_eq!(cell.bg, Color::rgb(1, 1, 1));
    }
}
