//! Color representation for display cells
//!
//! Two kinds of color live here:
//! - [`Rgb`]: a concrete 24-bit value, as stored in the palette and sent to viewers
//! - [`Color`]: what a cell refers to (default, palette index, or literal RGB)

use serde::{Deserialize, Serialize};

/// A concrete 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for (u8, u8, u8) {
    fn from(c: Rgb) -> Self {
        (c.r, c.g, c.b)
    }
}

/// Color reference held by a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Color {
    /// Default terminal color (foreground or background, depending on use)
    #[default]
    Default,
    /// Indexed color (0-255)
    /// 0-7: standard colors
    /// 8-15: bright colors
    /// 16-231: 6x6x6 color cube
    /// 232-255: grayscale
    Indexed(u8),
    /// 24-bit RGB color
    Rgb(Rgb),
}

impl Color {
    /// Create a new RGB color
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb(Rgb::new(r, g, b))
    }
}

/// Number of entries in every palette
pub const PALETTE_SIZE: usize = 256;

/// The built-in xterm 256-color table
pub fn standard_palette() -> [Rgb; PALETTE_SIZE] {
    let mut table = [Rgb::BLACK; PALETTE_SIZE];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = index_to_rgb(i as u8);
    }
    table
}

/// Convert a 256-color index to RGB values using xterm palette
fn index_to_rgb(index: u8) -> Rgb {
    let (r, g, b) = match index {
        // Standard colors (0-7)
        0 => (0, 0, 0),       // Black
        1 => (205, 0, 0),     // Red
        2 => (0, 205, 0),     // Green
        3 => (205, 205, 0),   // Yellow
        4 => (0, 0, 238),     // Blue
        5 => (205, 0, 205),   // Magenta
        6 => (0, 205, 205),   // Cyan
        7 => (229, 229, 229), // White

        // Bright colors (8-15)
        8 => (127, 127, 127),  // Bright Black (Gray)
        9 => (255, 0, 0),      // Bright Red
        10 => (0, 255, 0),     // Bright Green
        11 => (255, 255, 0),   // Bright Yellow
        12 => (92, 92, 255),   // Bright Blue
        13 => (255, 0, 255),   // Bright Magenta
        14 => (0, 255, 255),   // Bright Cyan
        15 => (255, 255, 255), // Bright White

        // 6x6x6 color cube (16-231)
        16..=231 => {
            let idx = index - 16;
            let r = idx / 36;
            let g = (idx % 36) / 6;
            let b = idx % 6;
            let to_val = |v: u8| if v == 0 { 0 } else { 55 + v * 40 };
            (to_val(r), to_val(g), to_val(b))
        }

        // Grayscale (232-255)
        232..=255 => {
            let gray = 8 + (index - 232) * 10;
            (gray, gray, gray)
        }
    };
    Rgb::new(r, g, b)
}
