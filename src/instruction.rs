//! Instructions sent to remote viewers
//!
//! Every surface call maps onto one instruction, and a resync is a plain
//! sequence of them, so a viewer that joins late and a viewer that has been
//! attached all along consume the same vocabulary.

use std::io::{self, BufRead, Write};
use std::sync::mpsc;

use serde::{Deserialize, Serialize};

use crate::cell::Glyph;
use crate::color::Rgb;
use crate::error::{DisplayError, Result};
use crate::geometry::{Geometry, PixelRect};
use crate::selection::Highlight;

/// One reconstruction or update instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Dimensions and pixel metrics of the display
    Size { geometry: Geometry },
    /// Colors used for `Color::Default`
    DefaultColors { foreground: Rgb, background: Rgb },
    /// All 256 palette entries
    Palette { colors: Vec<Rgb> },
    /// Fill a pixel rectangle with a solid color
    FillRect { rect: PixelRect, color: Rgb },
    /// Draw same-style glyphs starting at a cell
    DrawRun {
        row: usize,
        col: usize,
        glyphs: Vec<Glyph>,
    },
    /// Copy a pixel rectangle (atomically) to a new top-left corner
    CopyRect { src: PixelRect, dst_x: u32, dst_y: u32 },
    /// Replace the selection overlay
    Highlight { highlight: Option<Highlight> },
    /// End of a consistent frame
    Sync,
}

/// Output channel for one viewer (or one group of joining viewers)
pub trait ViewerChannel {
    fn send(&mut self, instruction: Instruction) -> Result<()>;
}

impl ViewerChannel for Vec<Instruction> {
    fn send(&mut self, instruction: Instruction) -> Result<()> {
        self.push(instruction);
        Ok(())
    }
}

impl ViewerChannel for mpsc::Sender<Instruction> {
    fn send(&mut self, instruction: Instruction) -> Result<()> {
        mpsc::Sender::send(self, instruction)
            .map_err(|_| DisplayError::Io(io::Error::from(io::ErrorKind::BrokenPipe)))
    }
}

/// Writes one JSON document per line
#[derive(Debug)]
pub struct JsonLinesChannel<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesChannel<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ViewerChannel for JsonLinesChannel<W> {
    fn send(&mut self, instruction: Instruction) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &instruction)?;
        self.writer.write_all(b"\n")?;
        if instruction == Instruction::Sync {
            self.writer.flush()?;
        }
        Ok(())
    }
}

/// Read back a stream written by [`JsonLinesChannel`]
pub fn read_json_lines<R: BufRead>(reader: R) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        instructions.push(serde_json::from_str(&line)?);
    }
    Ok(instructions)
}
