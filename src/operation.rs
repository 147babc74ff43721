//! Pending-operation grid
//!
//! One slot per visible cell, holding the latest pending mutation for that
//! cell. Writes never draw: they only replace the slot, so repeated writes
//! to a cell coalesce into the last one.
//!
//! Copies are composed when they are recorded. The source slot is copied
//! into the destination (memmove semantics within the range), and a source
//! with no pending change becomes `CopyFrom(source)`. Every `CopyFrom` in the
//! grid therefore names a cell whose *committed* content is wanted, never
//! another pending value.

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::{DisplayError, Result};

/// A pending change to one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Operation {
    /// No pending change
    #[default]
    NoOp,
    /// Take the committed content of another cell
    CopyFrom { row: usize, col: usize },
    /// Set the cell to literal content
    Set(Cell),
}

/// Allocate a dense row-major grid, surfacing allocation failure
pub(crate) fn allocate_grid<T: Clone>(width: usize, height: usize, fill: T) -> Result<Vec<T>> {
    let count = width
        .checked_mul(height)
        .ok_or(DisplayError::Allocation { width, height })?;
    let mut cells = Vec::new();
    cells
        .try_reserve_exact(count)
        .map_err(|_| DisplayError::Allocation { width, height })?;
    cells.resize(count, fill);
    Ok(cells)
}

/// The grid of pending operations for the visible area
#[derive(Debug, Clone)]
pub struct OperationGrid {
    /// Operations in row-major order
    ops: Vec<Operation>,
    /// Number of columns
    width: usize,
    /// Number of rows
    height: usize,
    /// Whether any `Set` is waiting for a flush
    unflushed_set: bool,
    /// Whether any `CopyFrom` is waiting for a flush
    unflushed_copy: bool,
}

impl OperationGrid {
    /// Create an all-`NoOp` grid with the given dimensions
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Ok(Self {
            ops: allocate_grid(width, height, Operation::NoOp)?,
            width,
            height,
            unflushed_set: false,
            unflushed_copy: false,
        })
    }

    /// Get number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the operation for a cell, returning None if out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<&Operation> {
        if row < self.height && col < self.width {
            self.ops.get(row * self.width + col)
        } else {
            None
        }
    }

    /// All operations in row-major order
    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    /// Whether any `Set` is waiting for a flush
    pub fn has_unflushed_set(&self) -> bool {
        self.unflushed_set
    }

    /// Whether anything at all is waiting for a flush
    pub fn is_pending(&self) -> bool {
        self.unflushed_set || self.unflushed_copy
    }

    /// Number of cells with a pending operation
    pub fn pending_count(&self) -> usize {
        self.ops.iter().filter(|op| **op != Operation::NoOp).count()
    }

    /// Reset every slot to `NoOp`
    pub fn clear(&mut self) {
        self.ops.fill(Operation::NoOp);
        self.unflushed_set = false;
        self.unflushed_copy = false;
    }

    /// What a copy from (row, col) should leave at its destination
    fn composed(&self, row: usize, col: usize) -> Operation {
        match self.ops[row * self.width + col] {
            Operation::NoOp => Operation::CopyFrom { row, col },
            other => other,
        }
    }

    /// Store a composed copy at its destination
    fn place(&mut self, row: usize, col: usize, op: Operation) {
        let op = match op {
            // Copying a cell back onto itself leaves nothing to do
            Operation::CopyFrom { row: r, col: c } if r == row && c == col => Operation::NoOp,
            Operation::Set(_) => {
                self.unflushed_set = true;
                op
            }
            Operation::CopyFrom { .. } => {
                self.unflushed_copy = true;
                op
            }
            Operation::NoOp => op,
        };
        self.ops[row * self.width + col] = op;
    }

    /// Copy columns `[start_col, end_col)` of `row` to `offset` columns away.
    /// Columns whose source or destination fall outside the grid are dropped.
    pub fn record_copy(&mut self, row: usize, start_col: usize, end_col: usize, offset: isize) {
        if offset == 0 || row >= self.height {
            return;
        }
        let end_col = end_col.min(self.width);

        // Read every source before writing any destination
        let moved: Vec<(usize, Operation)> = (start_col..end_col)
            .filter_map(|col| {
                let dest = col.checked_add_signed(offset).filter(|&d| d < self.width)?;
                Some((dest, self.composed(row, col)))
            })
            .collect();

        for (dest, op) in moved {
            self.place(row, dest, op);
        }
    }

    /// Copy whole rows `[start_row, end_row)` to `offset` rows away.
    /// Rows whose source or destination fall outside the grid are dropped.
    pub fn record_copy_rows(&mut self, start_row: usize, end_row: usize, offset: isize) {
        if offset == 0 {
            return;
        }
        let end_row = end_row.min(self.height);

        let mut moved = Vec::new();
        for row in start_row..end_row {
            let Some(dest) = row.checked_add_signed(offset).filter(|&d| d < self.height) else {
                continue;
            };
            for col in 0..self.width {
                moved.push((dest, col, self.composed(row, col)));
            }
        }

        for (dest, col, op) in moved {
            self.place(dest, col, op);
        }
    }

    /// Set columns `[start_col, end_col)` of `row` to copies of `cell`.
    /// Columns outside the grid are ignored.
    pub fn record_set(&mut self, row: usize, start_col: usize, end_col: usize, cell: &Cell) {
        if row >= self.height {
            return;
        }
        let end_col = end_col.min(self.width);
        if start_col >= end_col {
            return;
        }
        let base = row * self.width;
        self.ops[base + start_col..base + end_col].fill(Operation::Set(*cell));
        self.unflushed_set = true;
    }
}
