//! Display snapshot for testing and debugging
//!
//! A serializable view of the flushed state: cell text with attribute spans,
//! geometry and selection. Pending operations are only counted.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::color::Color;
use crate::geometry::Geometry;
use crate::selection::Selection;

/// Flushed state of a display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub geometry: Geometry,
    /// Screen content, one entry per row
    pub screen: Vec<SnapshotLine>,
    /// Active selection, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
    /// Cells with an operation waiting for the next flush
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotLine {
    /// Text content of the line
    pub text: String,
    /// Attribute spans, in columns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attrs: Vec<SnapshotAttrSpan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotAttrSpan {
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reverse: bool,
}

impl DisplaySnapshot {
    /// Capture committed cells laid out by `geometry`
    pub fn capture(
        geometry: &Geometry,
        cells: &[Cell],
        selection: &Selection,
        pending: usize,
    ) -> Self {
        let width = geometry.width.max(1);
        let screen = cells
            .chunks(width)
            .take(geometry.height)
            .map(|row| SnapshotLine {
                text: row
                    .iter()
                    .filter(|cell| !cell.is_continuation())
                    .map(Cell::symbol)
                    .collect(),
                attrs: extract_attr_spans(row),
            })
            .collect();

        Self {
            geometry: *geometry,
            screen,
            selection: selection.active.then_some(*selection),
            pending,
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get a simple text representation of the screen
    pub fn screen_text(&self) -> String {
        self.screen
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn color_name(color: Color) -> Option<String> {
    match color {
        Color::Default => None,
        Color::Indexed(i) => Some(format!("idx:{}", i)),
        Color::Rgb(rgb) => Some(format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b)),
    }
}

/// Group cells that carry colors or attributes into spans
fn extract_attr_spans(row: &[Cell]) -> Vec<SnapshotAttrSpan> {
    let mut spans: Vec<SnapshotAttrSpan> = Vec::new();

    for (col, cell) in row.iter().enumerate() {
        if cell.is_continuation() {
            if let Some(last) = spans.last_mut() {
                if last.end == col {
                    last.end = col + 1;
                }
            }
            continue;
        }

        let attrs = &cell.attrs;
        let styled = attrs.bold
            || attrs.italic
            || attrs.underline
            || attrs.reverse
            || cell.fg != Color::Default
            || cell.bg != Color::Default;
        if !styled {
            continue;
        }

        let span = SnapshotAttrSpan {
            start: col,
            end: col + 1,
            fg: color_name(cell.fg),
            bg: color_name(cell.bg),
            bold: attrs.bold,
            italic: attrs.italic,
            underline: attrs.underline,
            reverse: attrs.reverse,
        };

        match spans.last_mut() {
            Some(last)
                if last.end == col
                    && last.fg == span.fg
                    && last.bg == span.bg
                    && last.bold == span.bold
                    && last.italic == span.italic
                    && last.underline == span.underline
                    && last.reverse == span.reverse =>
            {
                last.end = col + 1;
            }
            _ => spans.push(span),
        }
    }

    spans
}
