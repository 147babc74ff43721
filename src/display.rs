//! Display
//!
//! The aggregate root. Owns the palette, the pending-operation grid, the
//! geometry, the selection and the surface it draws to. The emulation engine
//! records copies and sets; nothing reaches the surface until a flush.
//!
//! Two buffers describe what has already been flushed: the committed cells
//! (content as the engine wrote it) and the visible glyphs (those cells
//! resolved against the palette at the time they were drawn). Resync reads
//! only the visible glyphs, so a joining viewer sees exactly what everyone
//! else sees.

use tracing::{debug, info, warn};

use crate::cell::{Cell, CellAttributes, Glyph};
use crate::color::{Color, Rgb};
use crate::config::DisplayConfig;
use crate::error::{DisplayError, Result};
use crate::flush::{self, FlushStats};
use crate::font::{CharMetrics, FontDescription, FontMetrics};
use crate::geometry::{self, CellPoint, Geometry, PixelRect};
use crate::instruction::{Instruction, ViewerChannel};
use crate::operation::{allocate_grid, OperationGrid};
use crate::palette::Palette;
use crate::selection::{Highlight, Selection};
use crate::snapshot::DisplaySnapshot;
use crate::surface::Surface;

/// Screen model and reconciliation state for one remote terminal
pub struct Display<S: Surface> {
    surface: S,
    fonts: Box<dyn FontMetrics>,
    font: FontDescription,
    dpi: u32,
    geometry: Geometry,
    operations: OperationGrid,
    /// Flushed cell content, row-major
    committed: Vec<Cell>,
    /// Flushed glyphs as shown on the surface, row-major
    visible: Vec<Glyph>,
    palette: Palette,
    selection: Selection,
    /// Pixel size last given to the surface
    surface_size: (u32, u32),
    /// Whether anything was drawn since the last surface flush
    surface_dirty: bool,
}

/// Measure a font, mapping failure to `UnresolvableFont`
fn measure(fonts: &dyn FontMetrics, family: &str, size: u32, dpi: u32) -> Result<CharMetrics> {
    let unresolvable = |reason: String| DisplayError::UnresolvableFont {
        family: family.to_string(),
        size,
        dpi,
        reason,
    };
    if size == 0 || dpi == 0 {
        return Err(unresolvable("size and dpi must be positive".into()));
    }
    let metrics = fonts
        .measure(family, geometry::points_to_pixels(size, dpi))
        .map_err(unresolvable)?;
    if metrics.char_width == 0 || metrics.char_height == 0 {
        return Err(unresolvable("font has an empty cell".into()));
    }
    Ok(metrics)
}

/// Pixel extent of a geometry; one that cannot be addressed is an
/// allocation failure
fn pixel_size(geometry: &Geometry) -> Result<(u32, u32)> {
    geometry.pixel_size().ok_or(DisplayError::Allocation {
        width: geometry.width,
        height: geometry.height,
    })
}

impl<S: Surface> Display<S> {
    /// Create a display and paint the whole surface with the default
    /// background
    pub fn new(
        config: &DisplayConfig,
        mut surface: S,
        fonts: impl FontMetrics + 'static,
    ) -> Result<Self> {
        config.validate()?;
        let fonts: Box<dyn FontMetrics> = Box::new(fonts);
        let metrics = measure(fonts.as_ref(), &config.font_family, config.font_size, config.dpi)?;

        let geometry = Geometry {
            width: config.columns,
            height: config.rows,
            char_width: metrics.char_width,
            char_height: metrics.char_height,
            margin: geometry::margin_for_dpi(config.dpi),
        };
        let palette = Palette::new(
            config.foreground.into(),
            config.background.into(),
            config.palette_table(),
        );
        let blank = Glyph::blank(palette.default_foreground(), palette.default_background());

        let surface_size = pixel_size(&geometry)?;
        let operations = OperationGrid::new(geometry.width, geometry.height)?;
        let committed = allocate_grid(geometry.width, geometry.height, Cell::blank())?;
        let visible = allocate_grid(geometry.width, geometry.height, blank)?;

        surface.resize(&geometry);
        surface.fill_rect(
            PixelRect::new(0, 0, surface_size.0, surface_size.1),
            palette.default_background(),
        );

        info!(
            "Display created: {}x{} cells, font '{}' {}pt at {} dpi, cell {}x{}px, margin {}px",
            geometry.width,
            geometry.height,
            config.font_family,
            config.font_size,
            config.dpi,
            geometry.char_width,
            geometry.char_height,
            geometry.margin
        );

        Ok(Self {
            surface,
            fonts,
            font: FontDescription::new(config.font_family.clone(), config.font_size),
            dpi: config.dpi,
            geometry,
            operations,
            committed,
            visible,
            palette,
            selection: Selection::new(),
            surface_size,
            surface_dirty: true,
        })
    }

    // Palette

    /// Replace palette entry `index`
    pub fn assign_color(&mut self, index: i64, color: Rgb) -> Result<()> {
        self.palette.assign(index, color)
    }

    /// Read palette entry `index`
    pub fn lookup_color(&self, index: i64) -> Result<Rgb> {
        self.palette.lookup(index)
    }

    /// Restore all 256 palette entries from the default table
    pub fn reset_palette(&mut self) {
        self.palette.reset();
    }

    /// Colors applied to the next cell built with [`Display::glyph_cell`]
    pub fn set_glyph_colors(&mut self, foreground: Color, background: Color) {
        self.palette.set_glyph_colors(foreground, background);
    }

    pub fn glyph_colors(&self) -> (Color, Color) {
        self.palette.glyph_colors()
    }

    /// A cell carrying the current glyph colors
    pub fn glyph_cell(&self, symbol: char, attrs: CellAttributes) -> Cell {
        self.palette.glyph_cell(symbol, attrs)
    }

    // Cell operations

    /// Copy columns `[start_col, end_col)` of `row` by `offset` columns
    pub fn record_copy(&mut self, row: usize, start_col: usize, end_col: usize, offset: isize) {
        self.operations.record_copy(row, start_col, end_col, offset);
    }

    /// Copy rows `[start_row, end_row)` by `offset` rows
    pub fn record_copy_rows(&mut self, start_row: usize, end_row: usize, offset: isize) {
        self.operations.record_copy_rows(start_row, end_row, offset);
    }

    /// Set columns `[start_col, end_col)` of `row` to `cell`
    pub fn record_set(&mut self, row: usize, start_col: usize, end_col: usize, cell: &Cell) {
        self.operations.record_set(row, start_col, end_col, cell);
    }

    /// Resolve pending operations onto the surface without flushing the
    /// surface to observers
    pub fn flush_operations(&mut self) -> FlushStats {
        if !self.operations.is_pending() {
            return FlushStats::default();
        }
        let stats = flush::resolve(
            &self.operations,
            &mut self.committed,
            &mut self.visible,
            &self.geometry,
            &self.palette,
            &mut self.surface,
        );
        self.operations.clear();
        if stats.copies > 0 || stats.runs > 0 {
            self.surface_dirty = true;
        }
        debug!(
            "Flushed {} cells: {} copy rects, {} draw runs, {} demoted",
            stats.cells, stats.copies, stats.runs, stats.demoted
        );
        stats
    }

    /// Resolve pending operations and flush the surface to observers if
    /// anything changed since the previous flush
    pub fn flush(&mut self) -> FlushStats {
        let stats = self.flush_operations();
        if self.surface_dirty {
            self.surface.flush();
            self.surface_dirty = false;
        }
        stats
    }

    // Geometry

    /// Change the size in cells. Pending operations are discarded; flushed
    /// content inside the new bounds is kept and newly exposed cells are
    /// painted with the default background.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        let geometry = Geometry {
            width,
            height,
            ..self.geometry
        };
        let pixels = pixel_size(&geometry)?;
        if width == self.geometry.width && height == self.geometry.height && pixels == self.surface_size {
            return Ok(());
        }

        let blank = Glyph::blank(self.palette.default_foreground(), self.palette.default_background());
        let operations = OperationGrid::new(width, height)?;
        let mut committed = allocate_grid(width, height, Cell::blank())?;
        let mut visible = allocate_grid(width, height, blank)?;

        let old = self.geometry;
        let rows = height.min(old.height);
        let cols = width.min(old.width);
        for row in 0..rows {
            let from = row * old.width;
            let to = row * width;
            committed[to..to + cols].copy_from_slice(&self.committed[from..from + cols]);
            visible[to..to + cols].copy_from_slice(&self.visible[from..from + cols]);
        }

        let discarded = self.operations.pending_count();
        if discarded > 0 {
            debug!("Resize discarded {} pending operations", discarded);
        }

        if self.selection.active {
            self.selection.clear();
            self.surface.set_highlight(None);
        }

        self.geometry = geometry;
        self.operations = operations;
        self.committed = committed;
        self.visible = visible;
        self.surface_size = pixels;
        self.surface.resize(&geometry);

        // Everything right of and below the kept content, margins included
        let background = self.palette.default_background();
        let kept = geometry.cell_rect(0, 0, rows, cols);
        let right = kept.x + kept.width;
        let bottom = kept.y + kept.height;
        if right < pixels.0 {
            self.surface
                .fill_rect(PixelRect::new(right, 0, pixels.0 - right, pixels.1), background);
        }
        if bottom < pixels.1 {
            self.surface
                .fill_rect(PixelRect::new(0, bottom, right, pixels.1 - bottom), background);
        }
        self.surface_dirty = true;

        info!(
            "Display resized to {}x{} cells ({}x{}px)",
            width, height, pixels.0, pixels.1
        );
        Ok(())
    }

    /// Change the font. `None` keeps the current family or size; when the
    /// size is kept the current DPI is kept too. Only the character metrics
    /// change: call [`Display::resize`] afterwards to pick a new cell count.
    /// Until then the surface keeps its old pixel size, while a viewer
    /// joining through [`Display::dup`] already receives the new metrics.
    pub fn set_font(&mut self, family: Option<&str>, size: Option<u32>, dpi: u32) -> Result<()> {
        let family = family.unwrap_or(&self.font.family).to_string();
        let (size, dpi) = match size {
            Some(size) => (size, dpi),
            None => (self.font.size, self.dpi),
        };

        let metrics = match measure(self.fonts.as_ref(), &family, size, dpi) {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!("Keeping current font: {}", e);
                return Err(e);
            }
        };

        let geometry = Geometry {
            char_width: metrics.char_width,
            char_height: metrics.char_height,
            ..self.geometry
        };
        if let Err(e) = pixel_size(&geometry) {
            warn!("Keeping current font: {}", e);
            return Err(e);
        }

        self.font = FontDescription::new(family, size);
        self.dpi = dpi;
        self.geometry = geometry;

        if self.selection.active {
            let highlight = self.selection.highlight(&self.geometry);
            self.surface.set_highlight(highlight.as_ref());
            self.surface_dirty = true;
        }

        info!(
            "Font set to '{}' {}pt at {} dpi, cell {}x{}px",
            self.font.family, self.font.size, self.dpi, metrics.char_width, metrics.char_height
        );
        Ok(())
    }

    // Selection

    /// Select the text between two points given in any order
    pub fn select(&mut self, start_row: usize, start_col: usize, end_row: usize, end_col: usize) {
        self.selection.select(
            CellPoint::new(start_row, start_col),
            CellPoint::new(end_row, end_col),
        );
        let highlight = self.selection.highlight(&self.geometry);
        self.surface.set_highlight(highlight.as_ref());
        self.surface_dirty = true;
    }

    /// Remove the selection, if any
    pub fn clear_select(&mut self) {
        if !self.selection.active {
            return;
        }
        self.selection.clear();
        self.surface.set_highlight(None);
        self.surface_dirty = true;
    }

    // Resync

    /// Send a joining viewer (or group of viewers sharing `channel`)
    /// everything needed to reproduce the flushed state from a blank canvas.
    /// Pending operations are not part of that state and are left alone.
    pub fn dup<C: ViewerChannel + ?Sized>(&self, viewer: &str, channel: &mut C) -> Result<()> {
        let instructions = self.resync_instructions();
        let count = instructions.len();
        for instruction in instructions {
            channel.send(instruction)?;
        }
        debug!("Resync for {} sent {} instructions", viewer, count);
        Ok(())
    }

    fn resync_instructions(&self) -> Vec<Instruction> {
        let g = self.geometry;
        let foreground = self.palette.default_foreground();
        let background = self.palette.default_background();
        let blank = Glyph::blank(foreground, background);

        let mut out = vec![
            Instruction::Size { geometry: g },
            Instruction::DefaultColors {
                foreground,
                background,
            },
            Instruction::Palette {
                colors: self.palette.colors().to_vec(),
            },
            Instruction::FillRect {
                rect: PixelRect::new(0, 0, g.pixel_width(), g.pixel_height()),
                color: background,
            },
        ];

        for row in 0..g.height {
            let glyphs = &self.visible[row * g.width..(row + 1) * g.width];
            flush::for_each_run(glyphs, |col, run| {
                // Already painted by the fill
                if run.iter().all(|glyph| *glyph == blank) {
                    return;
                }
                out.push(Instruction::DrawRun {
                    row,
                    col,
                    glyphs: run.to_vec(),
                });
            });
        }

        if let Some(highlight) = self.selection.highlight(&g) {
            out.push(Instruction::Highlight {
                highlight: Some(highlight),
            });
        }
        out.push(Instruction::Sync);
        out
    }

    // Accessors

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn font(&self) -> &FontDescription {
        &self.font
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Overlay currently shown for the selection
    pub fn highlight(&self) -> Option<Highlight> {
        self.selection.highlight(&self.geometry)
    }

    /// Pending operations waiting for the next flush
    pub fn operations(&self) -> &OperationGrid {
        &self.operations
    }

    /// Flushed content of a cell
    pub fn committed_cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.geometry.index(row, col).map(|i| &self.committed[i])
    }

    /// Flushed glyph shown in a cell
    pub fn visible_glyph(&self, row: usize, col: usize) -> Option<&Glyph> {
        self.geometry.index(row, col).map(|i| &self.visible[i])
    }

    /// All flushed glyphs in row-major order
    pub fn visible_glyphs(&self) -> &[Glyph] {
        &self.visible
    }

    /// Flushed text of one row, continuation cells skipped
    pub fn row_text(&self, row: usize) -> String {
        if row >= self.geometry.height {
            return String::new();
        }
        let start = row * self.geometry.width;
        self.visible[start..start + self.geometry.width]
            .iter()
            .filter(|glyph| glyph.width != 0)
            .map(|glyph| glyph.symbol)
            .collect()
    }

    /// Flushed text of the whole screen, one line per row
    pub fn screen_text(&self) -> String {
        (0..self.geometry.height)
            .map(|row| self.row_text(row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Serializable view of the flushed state
    pub fn snapshot(&self) -> DisplaySnapshot {
        DisplaySnapshot::capture(
            &self.geometry,
            &self.committed,
            &self.selection,
            self.operations.pending_count(),
        )
    }
}

impl<S: Surface + std::fmt::Debug> std::fmt::Debug for Display<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Display")
            .field("surface", &self.surface)
            .field("font", &self.font)
            .field("dpi", &self.dpi)
            .field("geometry", &self.geometry)
            .field("selection", &self.selection)
            .field("pending", &self.operations.pending_count())
            .finish_non_exhaustive()
    }
}
