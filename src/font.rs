//! Font metrics
//!
//! The display only needs to know how large one character cell is for a
//! given family and pixel size. Glyph rasterization belongs to the surface
//! adapter. Font-file discovery belongs to the caller: families are
//! registered explicitly.

#[cfg(feature = "fonts")]
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Family and point size of the display font
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDescription {
    pub family: String,
    /// Size in points
    pub size: u32,
}

impl FontDescription {
    pub fn new(family: impl Into<String>, size: u32) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

/// Pixel size of one character cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharMetrics {
    pub char_width: u32,
    pub char_height: u32,
}

/// Source of character cell metrics
pub trait FontMetrics: Send {
    /// Measure one cell of `family` rendered at `size_px` pixels.
    /// Returns a human-readable reason on failure.
    fn measure(&self, family: &str, size_px: f32) -> Result<CharMetrics, String>;
}

/// Metrics derived from fixed width/height ratios of the pixel size.
///
/// Used for headless displays and tests, where no font file is available.
#[derive(Debug, Clone)]
pub struct FixedMetrics {
    families: Vec<String>,
    width_ratio: f32,
    height_ratio: f32,
}

impl FixedMetrics {
    /// Typical monospace proportions: 0.6em wide, 1.2em tall
    pub fn new<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_ratios(families, 0.6, 1.2)
    }

    pub fn with_ratios<I, S>(families: I, width_ratio: f32, height_ratio: f32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            families: families.into_iter().map(Into::into).collect(),
            width_ratio,
            height_ratio,
        }
    }
}

impl FontMetrics for FixedMetrics {
    fn measure(&self, family: &str, size_px: f32) -> Result<CharMetrics, String> {
        if !self.families.iter().any(|f| f.eq_ignore_ascii_case(family)) {
            return Err(format!("unknown font family '{}'", family));
        }
        let metrics = CharMetrics {
            char_width: (size_px * self.width_ratio).ceil() as u32,
            char_height: (size_px * self.height_ratio).ceil() as u32,
        };
        if metrics.char_width == 0 || metrics.char_height == 0 {
            return Err(format!("font size {}px is too small", size_px));
        }
        Ok(metrics)
    }
}

/// Metrics measured from real font files with fontdue
#[cfg(feature = "fonts")]
pub struct FontdueMetrics {
    fonts: HashMap<String, fontdue::Font>,
}

#[cfg(feature = "fonts")]
impl FontdueMetrics {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
        }
    }

    /// Register a family from font data bytes
    pub fn register(&mut self, family: &str, font_data: &[u8]) -> Result<(), String> {
        let font = fontdue::Font::from_bytes(font_data, fontdue::FontSettings::default())
            .map_err(|e| e.to_string())?;
        self.fonts.insert(family.to_lowercase(), font);
        Ok(())
    }

    /// Register a family from a font file
    pub fn register_file(
        &mut self,
        family: &str,
        path: &std::path::Path,
    ) -> crate::error::Result<()> {
        let data = std::fs::read(path)?;
        self.register(family, &data).map_err(|reason| {
            crate::error::DisplayError::Config(format!(
                "cannot load font {}: {}",
                path.display(),
                reason
            ))
        })?;
        tracing::info!("Loaded font '{}' from {}", family, path.display());
        Ok(())
    }

    pub fn is_registered(&self, family: &str) -> bool {
        self.fonts.contains_key(&family.to_lowercase())
    }
}

#[cfg(feature = "fonts")]
impl Default for FontdueMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "fonts")]
impl std::fmt::Debug for FontdueMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontdueMetrics")
            .field("families", &self.fonts.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(feature = "fonts")]
impl FontMetrics for FontdueMetrics {
    fn measure(&self, family: &str, size_px: f32) -> Result<CharMetrics, String> {
        let font = self
            .fonts
            .get(&family.to_lowercase())
            .ok_or_else(|| format!("font family '{}' is not registered", family))?;

        // Use 'M' as reference for width (em-width)
        let metrics = font.metrics('M', size_px);
        let line_metrics = font
            .horizontal_line_metrics(size_px)
            .ok_or_else(|| "no horizontal line metrics".to_string())?;

        let char_width = metrics.advance_width.ceil() as u32;
        let char_height = line_metrics.new_line_size.ceil() as u32;
        if char_width == 0 || char_height == 0 {
            return Err(format!("font measures {}x{} at {}px", char_width, char_height, size_px));
        }
        Ok(CharMetrics {
            char_width,
            char_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_metrics() {
        let fonts = FixedMetrics::new(["monospace"]);
        let m = fonts.measure("Monospace", 16.0).unwrap();
        assert_eq!(m.char_width, 10);
        assert_eq!(m.char_height, 20);
    }

    #[test]
    fn test_fixed_metrics_unknown_family() {
        let fonts = FixedMetrics::new(["monospace"]);
        assert!(fonts.measure("serif", 16.0).is_err());
    }

    #[test]
    fn test_fixed_metrics_zero_size() {
        let fonts = FixedMetrics::new(["monospace"]);
        assert!(fonts.measure("monospace", 0.0).is_err());
    }

    #[cfg(feature = "fonts")]
    #[test]
    fn test_fontdue_rejects_garbage() {
        let mut fonts = FontdueMetrics::new();
        assert!(fonts.register("broken", b"not a font").is_err());
        assert!(!fonts.is_registered("broken"));
        assert!(fonts.measure("broken", 12.0).is_err());
    }

    #[cfg(feature = "fonts")]
    #[test]
    fn test_fontdue_missing_file() {
        let mut fonts = FontdueMetrics::new();
        let err = fonts
            .register_file("mono", std::path::Path::new("/nonexistent/mono.ttf"))
            .unwrap_err();
        assert!(matches!(err, crate::error::DisplayError::Io(_)));
    }
}
