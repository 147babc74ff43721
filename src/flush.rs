//! Flush resolution
//!
//! Turns the pending-operation grid into surface calls in two passes:
//!
//! 1. Resolve every cell against the pre-flush content. Runs of `CopyFrom`
//!    sharing one offset are grouped into rectangles; `Set` cells take their
//!    literal value, resolved against the palette.
//! 2. Emit every copy rectangle first, then draw the literal cells batched
//!    into same-style runs.
//!
//! Each copy rectangle is atomic on the surface, but rectangles are applied
//! one after another. A rectangle whose source overlaps the destination of an
//! earlier rectangle would read already-updated pixels, so it is demoted to
//! literal draws of the pre-flush glyphs instead.

use crate::cell::{Cell, Glyph};
use crate::geometry::Geometry;
use crate::operation::{Operation, OperationGrid};
use crate::palette::Palette;
use crate::surface::Surface;

/// What happened during one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Copy rectangles sent to the surface
    pub copies: usize,
    /// Draw runs sent to the surface
    pub runs: usize,
    /// Cells that had to be redrawn because their copy source was clobbered
    pub demoted: usize,
    /// Cells whose content changed hands
    pub cells: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    /// Nothing pending
    Keep,
    /// Delivered by a copy rectangle
    Copied,
    /// Must be drawn literally
    Draw,
}

/// Resolve `grid` into `committed` (cell content) and `visible` (what the
/// surface shows), issuing the surface calls that get it there. The grid
/// itself is left for the caller to clear.
pub(crate) fn resolve<S: Surface>(
    grid: &OperationGrid,
    committed: &mut [Cell],
    visible: &mut [Glyph],
    geometry: &Geometry,
    palette: &Palette,
    surface: &mut S,
) -> FlushStats {
    let width = geometry.width;
    let height = geometry.height;
    let ops = grid.operations();
    let mut stats = FlushStats::default();

    let mut next = committed.to_vec();
    let mut shown = visible.to_vec();
    let mut resolution = vec![Resolution::Keep; ops.len()];
    let mut written = vec![false; ops.len()];

    // Offset of a copy relative to its destination
    let offset_at = |row: usize, col: usize| match ops[row * width + col] {
        Operation::CopyFrom { row: r, col: c } => {
            Some((r as isize - row as isize, c as isize - col as isize))
        }
        _ => None,
    };

    for row in 0..height {
        for col in 0..width {
            let i = row * width + col;
            match ops[i] {
                Operation::NoOp => {}
                Operation::Set(cell) => {
                    next[i] = cell;
                    shown[i] = palette.resolve(&cell);
                    resolution[i] = Resolution::Draw;
                    stats.cells += 1;
                }
                Operation::CopyFrom { row: src_row, col: src_col } => {
                    if resolution[i] != Resolution::Keep {
                        continue;
                    }
                    if src_row == row && src_col == col {
                        continue;
                    }
                    let offset = offset_at(row, col);
                    let joins = |r: usize, c: usize, resolution: &[Resolution]| {
                        resolution[r * width + c] == Resolution::Keep && offset_at(r, c) == offset
                    };

                    // Grow right, then down while whole rows match
                    let mut cols = 1;
                    while col + cols < width && joins(row, col + cols, &resolution) {
                        cols += 1;
                    }
                    let mut rows = 1;
                    while row + rows < height
                        && (col..col + cols).all(|c| joins(row + rows, c, &resolution))
                    {
                        rows += 1;
                    }

                    let source = |r: usize, c: usize| match ops[r * width + c] {
                        Operation::CopyFrom { row: sr, col: sc } => sr * width + sc,
                        _ => r * width + c,
                    };
                    let clobbered = (row..row + rows)
                        .any(|r| (col..col + cols).any(|c| written[source(r, c)]));

                    let outcome = if clobbered {
                        Resolution::Draw
                    } else {
                        Resolution::Copied
                    };
                    for r in row..row + rows {
                        for c in col..col + cols {
                            let dest = r * width + c;
                            next[dest] = committed[source(r, c)];
                            shown[dest] = visible[source(r, c)];
                            resolution[dest] = outcome;
                        }
                    }
                    stats.cells += rows * cols;

                    if clobbered {
                        stats.demoted += rows * cols;
                        continue;
                    }
                    let dst = geometry.cell_rect(row, col, rows, cols);
                    surface.copy_rect(geometry.cell_rect(src_row, src_col, rows, cols), dst.x, dst.y);
                    for r in row..row + rows {
                        written[r * width + col..r * width + col + cols].fill(true);
                    }
                    stats.copies += 1;
                }
            }
        }
    }

    for row in 0..height {
        let base = row * width;
        let mut col = 0;
        while col < width {
            if resolution[base + col] != Resolution::Draw {
                col += 1;
                continue;
            }
            let start = col;
            while col < width && resolution[base + col] == Resolution::Draw {
                col += 1;
            }
            for_each_run(&shown[base + start..base + col], |offset, run| {
                surface.draw_run(row, start + offset, run);
                stats.runs += 1;
            });
        }
    }

    committed.copy_from_slice(&next);
    visible.copy_from_slice(&shown);
    stats
}

/// Split contiguous glyphs into same-style runs, reporting each run with its
/// offset into `glyphs`
pub(crate) fn for_each_run(glyphs: &[Glyph], mut emit: impl FnMut(usize, &[Glyph])) {
    let mut start = 0;
    for i in 1..=glyphs.len() {
        if i == glyphs.len() || !glyphs[i].same_style(&glyphs[start]) {
            emit(start, &glyphs[start..i]);
            start = i;
        }
    }
}
