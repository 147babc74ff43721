//! Display geometry
//!
//! Cell counts, per-character pixel size and margin, plus the conversions
//! between cell and pixel coordinates. The drawable area is always
//! `margin*2 + width*char_width` by `margin*2 + height*char_height` pixels.

use serde::{Deserialize, Serialize};

/// Margin between the text and the border, in millimetres
pub const MARGIN_MM: f64 = 2.0;

/// Millimetres per inch, for mm -> px conversion: px = mm * dpi / 25.4
pub const MM_PER_INCH: f64 = 25.4;

/// Points per inch, for font size -> px conversion
pub const POINTS_PER_INCH: f64 = 72.0;

/// Margin in pixels for the given DPI
pub fn margin_for_dpi(dpi: u32) -> u32 {
    (MARGIN_MM * f64::from(dpi) / MM_PER_INCH) as u32
}

/// Font size in pixels for a point size at the given DPI
pub fn points_to_pixels(points: u32, dpi: u32) -> f32 {
    (f64::from(points) * f64::from(dpi) / POINTS_PER_INCH) as f32
}

/// `margin*2 + cells*cell_px`, checked
fn pixel_extent(cells: usize, cell_px: u32, margin: u32) -> Option<u32> {
    u32::try_from(cells)
        .ok()?
        .checked_mul(cell_px)?
        .checked_add(margin.checked_mul(2)?)
}

/// A position in the cell grid
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct CellPoint {
    pub row: usize,
    pub col: usize,
}

impl CellPoint {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Viewport size in cells and the pixel metrics derived from the font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
    /// Width of each character, in pixels
    pub char_width: u32,
    /// Height of each character, in pixels
    pub char_height: u32,
    /// Margin around the text area, in pixels
    pub margin: u32,
}

impl Geometry {
    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Pixel size (width, height) of the whole drawable area, or `None` if
    /// either extent does not fit in a `u32`
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        Some((
            pixel_extent(self.width, self.char_width, self.margin)?,
            pixel_extent(self.height, self.char_height, self.margin)?,
        ))
    }

    /// Pixel width of the whole drawable area, saturating at `u32::MAX`
    pub fn pixel_width(&self) -> u32 {
        pixel_extent(self.width, self.char_width, self.margin).unwrap_or(u32::MAX)
    }

    /// Pixel height of the whole drawable area, saturating at `u32::MAX`
    pub fn pixel_height(&self) -> u32 {
        pixel_extent(self.height, self.char_height, self.margin).unwrap_or(u32::MAX)
    }

    /// Row-major index of a cell, if it lies inside the grid
    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.height && col < self.width).then(|| row * self.width + col)
    }

    /// Pixel rectangle covering `rows` x `cols` cells starting at (row, col).
    /// Coordinates saturate at `u32::MAX` rather than wrap.
    pub fn cell_rect(&self, row: usize, col: usize, rows: usize, cols: usize) -> PixelRect {
        let span = |cells: usize, px: u32| {
            u32::try_from(cells)
                .ok()
                .and_then(|n| n.checked_mul(px))
                .unwrap_or(u32::MAX)
        };
        PixelRect {
            x: self.margin.saturating_add(span(col, self.char_width)),
            y: self.margin.saturating_add(span(row, self.char_height)),
            width: span(cols, self.char_width),
            height: span(rows, self.char_height),
        }
    }

    /// Cell containing the pixel (x, y), if any
    pub fn cell_at(&self, x: u32, y: u32) -> Option<CellPoint> {
        if self.char_width == 0 || self.char_height == 0 || x < self.margin || y < self.margin {
            return None;
        }
        let col = ((x - self.margin) / self.char_width) as usize;
        let row = ((y - self.margin) / self.char_height) as usize;
        (row < self.height && col < self.width).then(|| CellPoint::new(row, col))
    }

    /// Number of whole cells (cols, rows) that fit in a pixel area with the
    /// current metrics. Used by callers to pick the cell count after a font
    /// change.
    pub fn cells_for_pixels(&self, width_px: u32, height_px: u32) -> (usize, usize) {
        if self.char_width == 0 || self.char_height == 0 {
            return (0, 0);
        }
        let usable_w = width_px.saturating_sub(self.margin.saturating_mul(2));
        let usable_h = height_px.saturating_sub(self.margin.saturating_mul(2));
        (
            (usable_w / self.char_width) as usize,
            (usable_h / self.char_height) as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> Geometry {
        Geometry {
            width: 80,
            height: 24,
            char_width: 8,
            char_height: 16,
            margin: 7,
        }
    }

    #[test]
    fn test_margin_for_dpi() {
        assert_eq!(margin_for_dpi(96), 7);
        assert_eq!(margin_for_dpi(254), 20);
    }

    #[test]
    fn test_points_to_pixels() {
        assert_eq!(points_to_pixels(12, 96), 16.0);
        assert_eq!(points_to_pixels(12, 72), 12.0);
    }

    #[test]
    fn test_pixel_extent() {
        let g = geometry();
        assert_eq!(g.pixel_width(), 7 * 2 + 80 * 8);
        assert_eq!(g.pixel_height(), 7 * 2 + 24 * 16);
    }

    #[test]
    fn test_pixel_size_overflow() {
        let g = geometry();
        assert_eq!(g.pixel_size(), Some((g.pixel_width(), g.pixel_height())));

        let wide = Geometry {
            width: 500_000_000,
            ..g
        };
        assert_eq!(wide.pixel_size(), None);
        assert_eq!(wide.pixel_width(), u32::MAX);

        let tall = Geometry {
            height: usize::MAX,
            ..g
        };
        assert_eq!(tall.pixel_size(), None);
        assert_eq!(tall.cell_rect(usize::MAX, 0, 1, 1).y, u32::MAX);
    }

    #[test]
    fn test_cell_rect_and_back() {
        let g = geometry();
        let rect = g.cell_rect(2, 3, 1, 4);
        assert_eq!(rect, PixelRect::new(7 + 24, 7 + 32, 32, 16));
        assert_eq!(g.cell_at(rect.x, rect.y), Some(CellPoint::new(2, 3)));
        assert_eq!(g.cell_at(rect.x + 31, rect.y + 15), Some(CellPoint::new(2, 6)));
    }

    #[test]
    fn test_cell_at_outside() {
        let g = geometry();
        assert_eq!(g.cell_at(0, 0), None);
        assert_eq!(g.cell_at(g.pixel_width() - 1, 10), None);
    }

    #[test]
    fn test_index_bounds() {
        let g = geometry();
        assert_eq!(g.index(0, 0), Some(0));
        assert_eq!(g.index(1, 0), Some(80));
        assert_eq!(g.index(24, 0), None);
        assert_eq!(g.index(0, 80), None);
    }

    #[test]
    fn test_cells_for_pixels() {
        let g = geometry();
        assert_eq!(g.cells_for_pixels(g.pixel_width(), g.pixel_height()), (80, 24));
        assert_eq!(g.cells_for_pixels(10, 10), (0, 0));
    }
}
