//! Shared helpers for the integration suites

#![allow(dead_code)]

use std::sync::Once;

use mochi_display::{
    Cell, Display, DisplayConfig, FixedMetrics, Instruction, MirrorSurface, Replica, Surface,
};

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn config(columns: usize, rows: usize) -> DisplayConfig {
    DisplayConfig {
        columns,
        rows,
        ..DisplayConfig::default()
    }
}

pub fn fonts() -> FixedMetrics {
    FixedMetrics::new(["monospace", "serif"])
}

/// Display whose surface records every instruction a live viewer receives
pub fn mirrored(columns: usize, rows: usize) -> Display<MirrorSurface<Vec<Instruction>>> {
    init_tracing();
    Display::new(&config(columns, rows), MirrorSurface::new(Vec::new()), fonts())
        .expect("display")
}

/// Write `text` one cell at a time starting at (row, col)
pub fn write<S: Surface>(display: &mut Display<S>, row: usize, col: usize, text: &str) {
    for (i, c) in text.chars().enumerate() {
        display.record_set(row, col + i, col + i + 1, &Cell::with_char(c));
    }
}

/// Replica built by a resync of `display`
pub fn resynced<S: Surface>(display: &Display<S>) -> Replica {
    let mut replica = Replica::new();
    display.dup("test-viewer", &mut replica).expect("dup");
    replica
}
