//! Configuration for a display
//!
//! Everything needed to construct a [`crate::Display`]: font, DPI, default
//! colors, an optional 256-entry default palette and the initial size in
//! cells. Can be loaded from JSON; every field has a default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::{Rgb, PALETTE_SIZE};
use crate::error::{DisplayError, Result};

/// Display construction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Font family name
    pub font_family: String,
    /// Font size in points
    pub font_size: u32,
    /// Resolution of the remote display
    pub dpi: u32,
    /// Default foreground color
    pub foreground: (u8, u8, u8),
    /// Default background color
    pub background: (u8, u8, u8),
    /// Replacement for the built-in 256-color table (exactly 256 entries)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<(u8, u8, u8)>>,
    /// Initial width in cells
    pub columns: usize,
    /// Initial height in cells
    pub rows: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            font_family: "monospace".to_string(),
            font_size: 12,
            dpi: 96,
            foreground: (255, 255, 255),
            background: (0, 0, 0),
            palette: None,
            columns: 80,
            rows: 24,
        }
    }
}

impl DisplayConfig {
    /// Parse a config from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        tracing::info!("Loaded display config from {}", path.display());
        Ok(config)
    }

    /// Check the values that construction depends on
    pub fn validate(&self) -> Result<()> {
        if self.font_family.trim().is_empty() {
            return Err(DisplayError::Config("font_family must not be empty".into()));
        }
        if self.font_size == 0 {
            return Err(DisplayError::Config("font_size must be positive".into()));
        }
        if self.dpi == 0 {
            return Err(DisplayError::Config("dpi must be positive".into()));
        }
        if self.columns == 0 || self.rows == 0 {
            return Err(DisplayError::Config(format!(
                "display must be at least 1x1 cells, got {}x{}",
                self.columns, self.rows
            )));
        }
        if let Some(palette) = &self.palette {
            if palette.len() != PALETTE_SIZE {
                return Err(DisplayError::Config(format!(
                    "palette must have {} entries, got {}",
                    PALETTE_SIZE,
                    palette.len()
                )));
            }
        }
        Ok(())
    }

    /// The default palette table to hand over to the display, if any
    pub fn palette_table(&self) -> Option<Box<[Rgb; PALETTE_SIZE]>> {
        let entries = self.palette.as_ref()?;
        let mut table = Box::new([Rgb::BLACK; PALETTE_SIZE]);
        for (slot, &entry) in table.iter_mut().zip(entries) {
            *slot = entry.into();
        }
        Some(table)
    }
}
