//! Mochi Display - screen model for remotely mirrored terminals
//!
//! The emulation engine records cell copies and sets on a [`Display`]; they
//! coalesce in a pending-operation grid until a flush resolves them into
//! copy rectangles and draw runs on a [`Surface`]. Viewers that join later
//! are brought up to date with [`Display::dup`].
//!
//! - `operation`: pending-operation grid and coalescing
//! - `palette`, `color`, `cell`: the data model
//! - `geometry`, `font`: cell and pixel metrics
//! - `selection`: overlay highlight
//! - `surface`, `instruction`, `replica`: the drawing boundary and the
//!   instruction stream viewers consume
//! - `shared`: one lock around a display used from several threads

mod cell;
mod color;
pub mod config;
mod display;
pub mod error;
mod flush;
pub mod font;
pub mod geometry;
pub mod instruction;
mod operation;
mod palette;
mod replica;
pub mod selection;
mod shared;
mod snapshot;
mod surface;

pub use cell::{Cell, CellAttributes, Glyph, MAX_CHAR_WIDTH};
pub use color::{standard_palette, Color, Rgb, PALETTE_SIZE};
pub use config::DisplayConfig;
pub use display::Display;
pub use error::{DisplayError, Result};
pub use flush::FlushStats;
#[cfg(feature = "fonts")]
pub use font::FontdueMetrics;
pub use font::{CharMetrics, FixedMetrics, FontDescription, FontMetrics};
pub use geometry::{CellPoint, Geometry, PixelRect};
pub use instruction::{read_json_lines, Instruction, JsonLinesChannel, ViewerChannel};
pub use operation::{Operation, OperationGrid};
pub use palette::Palette;
pub use replica::Replica;
pub use selection::{Highlight, Selection};
pub use shared::SharedDisplay;
pub use snapshot::{DisplaySnapshot, SnapshotAttrSpan, SnapshotLine};
pub use surface::{MirrorSurface, Surface};
