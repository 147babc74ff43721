//! Viewer-side model of a display
//!
//! A `Replica` starts as a blank canvas and applies instructions exactly as a
//! remote viewer would. It is also a [`Surface`], which makes it a headless
//! drawing target.

use crate::cell::Glyph;
use crate::color::{Rgb, PALETTE_SIZE};
use crate::geometry::{Geometry, PixelRect};
use crate::instruction::{Instruction, ViewerChannel};
use crate::selection::Highlight;
use crate::surface::Surface;

/// What a viewer currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replica {
    geometry: Geometry,
    glyphs: Vec<Glyph>,
    palette: Vec<Rgb>,
    default_foreground: Rgb,
    default_background: Rgb,
    highlight: Option<Highlight>,
    syncs: usize,
}

impl Replica {
    /// A blank canvas of size zero
    pub fn new() -> Self {
        Self {
            geometry: Geometry {
                width: 0,
                height: 0,
                char_width: 0,
                char_height: 0,
                margin: 0,
            },
            glyphs: Vec::new(),
            palette: Vec::new(),
            default_foreground: Rgb::WHITE,
            default_background: Rgb::BLACK,
            highlight: None,
            syncs: 0,
        }
    }

    /// Apply a sequence of instructions in order
    pub fn apply_all<'a, I>(&mut self, instructions: I)
    where
        I: IntoIterator<Item = &'a Instruction>,
    {
        for instruction in instructions {
            self.apply(instruction);
        }
    }

    pub fn apply(&mut self, instruction: &Instruction) {
        match instruction {
            Instruction::Size { geometry } => self.resize_to(*geometry),
            Instruction::DefaultColors {
                foreground,
                background,
            } => {
                self.default_foreground = *foreground;
                self.default_background = *background;
            }
            Instruction::Palette { colors } => {
                self.palette = colors.iter().copied().take(PALETTE_SIZE).collect();
            }
            Instruction::FillRect { rect, color } => {
                let blank = Glyph::blank(self.default_foreground, *color);
                let (rows, cols) = self.cells_in(rect);
                for row in rows {
                    for col in cols.clone() {
                        self.glyphs[row * self.geometry.width + col] = blank;
                    }
                }
            }
            Instruction::DrawRun { row, col, glyphs } => {
                if *row >= self.geometry.height {
                    return;
                }
                for (i, glyph) in glyphs.iter().enumerate() {
                    let c = col + i;
                    if c >= self.geometry.width {
                        break;
                    }
                    self.glyphs[row * self.geometry.width + c] = *glyph;
                }
            }
            Instruction::CopyRect { src, dst_x, dst_y } => self.copy(src, *dst_x, *dst_y),
            Instruction::Highlight { highlight } => self.highlight = highlight.clone(),
            Instruction::Sync => self.syncs += 1,
        }
    }

    fn resize_to(&mut self, geometry: Geometry) {
        let blank = Glyph::blank(self.default_foreground, self.default_background);
        let mut glyphs = vec![blank; geometry.cell_count()];
        let rows = geometry.height.min(self.geometry.height);
        let cols = geometry.width.min(self.geometry.width);
        for row in 0..rows {
            let old = row * self.geometry.width;
            let new = row * geometry.width;
            glyphs[new..new + cols].copy_from_slice(&self.glyphs[old..old + cols]);
        }
        self.geometry = geometry;
        self.glyphs = glyphs;
    }

    /// Cells touched by a pixel rectangle, clipped to the grid
    fn cells_in(&self, rect: &PixelRect) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        let g = &self.geometry;
        if g.char_width == 0 || g.char_height == 0 || rect.is_empty() {
            return (0..0, 0..0);
        }
        let span = |start: u32, len: u32, cell: u32, limit: usize| {
            let from = start.saturating_sub(g.margin) / cell;
            let to = (start + len).saturating_sub(g.margin).div_ceil(cell);
            (from as usize).min(limit)..(to as usize).min(limit)
        };
        (
            span(rect.y, rect.height, g.char_height, g.height),
            span(rect.x, rect.width, g.char_width, g.width),
        )
    }

    fn copy(&mut self, src: &PixelRect, dst_x: u32, dst_y: u32) {
        let g = self.geometry;
        let Some(from) = g.cell_at(src.x, src.y) else {
            return;
        };
        let Some(to) = g.cell_at(dst_x, dst_y) else {
            return;
        };
        let rows = (src.height / g.char_height) as usize;
        let cols = (src.width / g.char_width) as usize;

        // Read the whole source before writing
        let mut moved = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                if let Some(i) = g.index(from.row + r, from.col + c) {
                    moved.push((to.row + r, to.col + c, self.glyphs[i]));
                }
            }
        }
        for (row, col, glyph) in moved {
            if let Some(i) = g.index(row, col) {
                self.glyphs[i] = glyph;
            }
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn glyph(&self, row: usize, col: usize) -> Option<&Glyph> {
        self.geometry.index(row, col).map(|i| &self.glyphs[i])
    }

    /// All glyphs in row-major order
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    /// (foreground, background)
    pub fn default_colors(&self) -> (Rgb, Rgb) {
        (self.default_foreground, self.default_background)
    }

    pub fn highlight(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    /// Number of completed frames
    pub fn sync_count(&self) -> usize {
        self.syncs
    }

    /// Text of one row, continuation cells skipped
    pub fn row_text(&self, row: usize) -> String {
        if row >= self.geometry.height {
            return String::new();
        }
        let start = row * self.geometry.width;
        self.glyphs[start..start + self.geometry.width]
            .iter()
            .filter(|g| g.width != 0)
            .map(|g| g.symbol)
            .collect()
    }

    /// Text of the whole screen, one line per row
    pub fn screen_text(&self) -> String {
        (0..self.geometry.height)
            .map(|row| self.row_text(row))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Replica {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewerChannel for Replica {
    fn send(&mut self, instruction: Instruction) -> crate::error::Result<()> {
        self.apply(&instruction);
        Ok(())
    }
}

impl Surface for Replica {
    fn resize(&mut self, geometry: &Geometry) {
        self.resize_to(*geometry);
    }

    fn draw_run(&mut self, row: usize, col: usize, glyphs: &[Glyph]) {
        self.apply(&Instruction::DrawRun {
            row,
            col,
            glyphs: glyphs.to_vec(),
        });
    }

    fn copy_rect(&mut self, src: PixelRect, dst_x: u32, dst_y: u32) {
        self.copy(&src, dst_x, dst_y);
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        self.apply(&Instruction::FillRect { rect, color });
    }

    fn set_highlight(&mut self, highlight: Option<&Highlight>) {
        self.highlight = highlight.cloned();
    }

    fn flush(&mut self) {
        self.syncs += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellAttributes;

    fn geometry(width: usize, height: usize) -> Geometry {
        Geometry {
            width,
            height,
            char_width: 4,
            char_height: 8,
            margin: 3,
        }
    }

    fn glyph(c: char) -> Glyph {
        Glyph {
            symbol: c,
            width: 1,
            fg: Rgb::WHITE,
            bg: Rgb::BLACK,
            attrs: CellAttributes::new(),
        }
    }

    fn replica_with_rows(rows: &[&str]) -> Replica {
        let width = rows[0].chars().count();
        let mut replica = Replica::new();
        replica.apply(&Instruction::Size {
            geometry: geometry(width, rows.len()),
        });
        for (row, text) in rows.iter().enumerate() {
            replica.apply(&Instruction::DrawRun {
                row,
                col: 0,
                glyphs: text.chars().map(glyph).collect(),
            });
        }
        replica
    }

    #[test]
    fn test_draw_run_clipped() {
        let mut replica = replica_with_rows(&["....", "...."]);
        replica.apply(&Instruction::DrawRun {
            row: 0,
            col: 2,
            glyphs: "abcdef".chars().map(glyph).collect(),
        });
        replica.apply(&Instruction::DrawRun {
            row: 9,
            col: 0,
            glyphs: vec![glyph('z')],
        });
        assert_eq!(replica.screen_text(), "..ab\n....");
    }

    #[test]
    fn test_copy_is_atomic() {
        let mut replica = replica_with_rows(&["aaaa", "bbbb", "cccc"]);
        let g = *replica.geometry();
        // Scroll down by one row in a single overlapping copy
        let src = g.cell_rect(0, 0, 2, 4);
        let dst = g.cell_rect(1, 0, 1, 1);
        replica.apply(&Instruction::CopyRect {
            src,
            dst_x: dst.x,
            dst_y: dst.y,
        });
        assert_eq!(replica.screen_text(), "aaaa\naaaa\nbbbb");
    }

    #[test]
    fn test_fill_covers_margin_rect() {
        let mut replica = replica_with_rows(&["ab", "cd"]);
        let g = *replica.geometry();
        replica.apply(&Instruction::FillRect {
            rect: PixelRect::new(0, 0, g.pixel_width(), g.pixel_height()),
            color: Rgb::new(9, 9, 9),
        });
        assert_eq!(replica.screen_text(), "  \n  ");
        assert_eq!(replica.glyph(1, 1).unwrap().bg, Rgb::new(9, 9, 9));
    }

    #[test]
    fn test_fill_partial() {
        let mut replica = replica_with_rows(&["abcd"]);
        let g = *replica.geometry();
        replica.apply(&Instruction::FillRect {
            rect: g.cell_rect(0, 1, 1, 2),
            color: Rgb::BLACK,
        });
        assert_eq!(replica.screen_text(), "a  d");
    }

    #[test]
    fn test_resize_keeps_overlap() {
        let mut replica = replica_with_rows(&["abc", "def"]);
        replica.apply(&Instruction::Size {
            geometry: geometry(2, 3),
        });
        assert_eq!(replica.screen_text(), "ab\nde\n  ");
    }

    #[test]
    fn test_sync_and_highlight() {
        let mut replica = Replica::new();
        replica.apply(&Instruction::Sync);
        assert_eq!(replica.sync_count(), 1);
        assert!(replica.highlight().is_none());
    }
}
