//! Text selection overlay
//!
//! Selection is linear in reading order: it runs from the start point to the
//! end of its row, covers full rows in between, and ends at the end point
//! (inclusive). It is drawn on its own layer and never touches cell content.

use serde::{Deserialize, Serialize};

use crate::geometry::{CellPoint, Geometry, PixelRect};

/// Selection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Earlier endpoint in reading order
    pub start: CellPoint,
    /// Later endpoint in reading order (inclusive)
    pub end: CellPoint,
    /// Whether selection is active
    pub active: bool,
}

impl Selection {
    /// Create a new inactive selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Select between two points given in any order
    pub fn select(&mut self, a: CellPoint, b: CellPoint) {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        self.start = start;
        self.end = end;
        self.active = true;
    }

    /// Clear the selection
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Overlay geometry for the current selection, clipped to the grid
    pub fn highlight(&self, geometry: &Geometry) -> Option<Highlight> {
        if !self.active {
            return None;
        }
        Some(Highlight {
            start: self.start,
            end: self.end,
            rects: highlight_rects(self.start, self.end, geometry),
        })
    }
}

/// What the overlay layer shows for an active selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub start: CellPoint,
    pub end: CellPoint,
    /// At most three rectangles: first row, full middle rows, last row
    pub rects: Vec<PixelRect>,
}

fn highlight_rects(start: CellPoint, end: CellPoint, geometry: &Geometry) -> Vec<PixelRect> {
    let width = geometry.width;
    let height = geometry.height;
    if width == 0 || start.row >= height {
        return Vec::new();
    }
    let last_row = end.row.min(height - 1);
    let end_col = if end.row == last_row {
        end.col.min(width - 1)
    } else {
        width - 1
    };

    let mut rects = Vec::with_capacity(3);
    if start.row == last_row {
        if start.col <= end_col {
            rects.push(geometry.cell_rect(start.row, start.col, 1, end_col - start.col + 1));
        }
        return rects;
    }

    // First row: start point to end of row
    if start.col < width {
        rects.push(geometry.cell_rect(start.row, start.col, 1, width - start.col));
    }

    // Full rows in between
    let middle = last_row - start.row - 1;
    if middle > 0 {
        rects.push(geometry.cell_rect(start.row + 1, 0, middle, width));
    }

    // Last row: start of row to end point
    rects.push(geometry.cell_rect(last_row, 0, 1, end_col + 1));
    rects
}
