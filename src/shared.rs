//! Display shared between execution contexts
//!
//! The writer, periodic flushes and joining viewers may run on different
//! threads. All of them go through one lock around the whole [`Display`], so
//! grid, geometry, palette and selection are always observed together and a
//! resync never sees a half-finished flush.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::display::Display;
use crate::error::Result;
use crate::flush::FlushStats;
use crate::instruction::ViewerChannel;
use crate::surface::Surface;

/// Cloneable handle to a display behind a single lock
pub struct SharedDisplay<S: Surface> {
    inner: Arc<Mutex<Display<S>>>,
}

impl<S: Surface> Clone for SharedDisplay<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Surface> SharedDisplay<S> {
    pub fn new(display: Display<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(display)),
        }
    }

    /// Lock the display for a sequence of calls that must not interleave
    /// with other contexts
    pub fn lock(&self) -> MutexGuard<'_, Display<S>> {
        self.inner.lock()
    }

    /// Run `f` with the display locked
    pub fn with<R>(&self, f: impl FnOnce(&mut Display<S>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn flush(&self) -> FlushStats {
        self.inner.lock().flush()
    }

    /// Resync a joining viewer. The whole instruction stream is written
    /// under the lock, so racing resyncs never interleave.
    pub fn dup<C: ViewerChannel + ?Sized>(&self, viewer: &str, channel: &mut C) -> Result<()> {
        self.inner.lock().dup(viewer, channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::config::DisplayConfig;
    use crate::font::FixedMetrics;
    use crate::replica::Replica;

    fn shared() -> SharedDisplay<Replica> {
        let config = DisplayConfig {
            columns: 4,
            rows: 1,
            ..DisplayConfig::default()
        };
        let display = Display::new(&config, Replica::new(), FixedMetrics::new(["monospace"])).unwrap();
        SharedDisplay::new(display)
    }

    #[test]
    fn test_clones_share_state() {
        let a = shared();
        let b = a.clone();
        a.with(|d| d.record_set(0, 0, 4, &Cell::with_char('x')));
        b.flush();
        assert_eq!(a.lock().screen_text(), "xxxx");
    }

    #[test]
    fn test_dup_through_handle() {
        let display = shared();
        display.with(|d| d.record_set(0, 1, 2, &Cell::with_char('y')));
        display.flush();
        let mut replica = Replica::new();
        display.dup("viewer", &mut replica).unwrap();
        assert_eq!(replica.screen_text(), " y  ");
    }
}
