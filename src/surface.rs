//! Drawing surface boundary
//!
//! The display resolves pending operations into these primitive requests and
//! never touches pixels itself. Rows and columns are cell coordinates;
//! rectangles are pixel coordinates in the space described by the last
//! [`Surface::resize`].

use crate::cell::Glyph;
use crate::color::Rgb;
use crate::geometry::{Geometry, PixelRect};
use crate::instruction::{Instruction, ViewerChannel};
use crate::selection::Highlight;

/// Externally-owned drawing surface with a content layer and a selection
/// overlay layer
pub trait Surface {
    /// Resize the drawable area, keeping existing content in place
    fn resize(&mut self, geometry: &Geometry);

    /// Draw a run of same-style glyphs starting at (row, col)
    fn draw_run(&mut self, row: usize, col: usize, glyphs: &[Glyph]);

    /// Copy a pixel region; the source is read completely before writing
    fn copy_rect(&mut self, src: PixelRect, dst_x: u32, dst_y: u32);

    /// Fill a pixel region with a solid color
    fn fill_rect(&mut self, rect: PixelRect, color: Rgb);

    /// Replace the selection overlay (`None` removes it)
    fn set_highlight(&mut self, highlight: Option<&Highlight>);

    /// Push everything drawn so far to observers
    fn flush(&mut self);
}

/// Surface that mirrors every call to a viewer channel as an [`Instruction`]
#[derive(Debug)]
pub struct MirrorSurface<C: ViewerChannel> {
    channel: C,
    failures: usize,
}

impl<C: ViewerChannel> MirrorSurface<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            failures: 0,
        }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Number of instructions the channel refused
    pub fn failures(&self) -> usize {
        self.failures
    }

    fn emit(&mut self, instruction: Instruction) {
        if let Err(e) = self.channel.send(instruction) {
            self.failures += 1;
            tracing::warn!("Failed to mirror surface update: {}", e);
        }
    }
}

impl<C: ViewerChannel> Surface for MirrorSurface<C> {
    fn resize(&mut self, geometry: &Geometry) {
        self.emit(Instruction::Size {
            geometry: *geometry,
        });
    }

    fn draw_run(&mut self, row: usize, col: usize, glyphs: &[Glyph]) {
        self.emit(Instruction::DrawRun {
            row,
            col,
            glyphs: glyphs.to_vec(),
        });
    }

    fn copy_rect(&mut self, src: PixelRect, dst_x: u32, dst_y: u32) {
        self.emit(Instruction::CopyRect { src, dst_x, dst_y });
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        self.emit(Instruction::FillRect { rect, color });
    }

    fn set_highlight(&mut self, highlight: Option<&Highlight>) {
        self.emit(Instruction::Highlight {
            highlight: highlight.cloned(),
        });
    }

    fn flush(&mut self) {
        self.emit(Instruction::Sync);
    }
}
