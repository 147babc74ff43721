//! Error types for display operations
//!
//! Out-of-range copy/set requests are never errors: they are clamped or
//! ignored where they are recorded.

use std::io;
use thiserror::Error;

/// Display error type
#[derive(Error, Debug)]
pub enum DisplayError {
    /// Palette index outside 0-255
    #[error("Palette index {0} is out of range (0-255)")]
    InvalidIndex(i64),

    /// Font family/size/DPI combination could not be measured
    #[error("Cannot resolve font '{family}' at {size}pt/{dpi}dpi: {reason}")]
    UnresolvableFont {
        family: String,
        size: u32,
        dpi: u32,
        reason: String,
    },

    /// Operation grid or committed grid could not be allocated
    #[error("Failed to allocate a {width}x{height} cell grid")]
    Allocation { width: usize, height: usize },

    /// Invalid construction parameters
    #[error("Invalid display configuration: {0}")]
    Config(String),

    /// I/O error (transport or config file)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Instruction or config (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for display operations
pub type Result<T> = std::result::Result<T, DisplayError>;
