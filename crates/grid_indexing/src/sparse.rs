//! Sparse boolean matrices.
//!
//! [`SparseBoolMatrix`] stores the coordinates of its `true` entries, sorted row-major and
//! deduplicated, together with an explicit shape. [`BlockAssembler`] is the layout step that
//! scatters per-block matrices into one matrix addressed by global indices.
use crate::error::{Error, Result};

/// Boolean matrix in coordinate format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseBoolMatrix {
    shape: (usize, usize),
    entries: Vec<(usize, usize)>,
}

impl SparseBoolMatrix {
    /// All-false matrix of the given shape.
    pub fn empty(shape: (usize, usize)) -> Self {
        Self {
            shape,
            entries: Vec::new(),
        }
    }

    /// Builds a matrix from the coordinates of its `true` entries.
    ///
    /// Duplicates are merged. Fails with [`Error::IndexOutOfRange`] if a coordinate lies
    /// outside `shape`.
    pub fn from_entries(shape: (usize, usize), mut entries: Vec<(usize, usize)>) -> Result<Self> {
        for &(row, col) in &entries {
            if row >= shape.0 {
                return Err(Error::IndexOutOfRange {
                    index: row,
                    len: shape.0,
                });
            }
            if col >= shape.1 {
                return Err(Error::IndexOutOfRange {
                    index: col,
                    len: shape.1,
                });
            }
        }
        entries.sort_unstable();
        entries.dedup();
        Ok(Self { shape, entries })
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Number of `true` entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.entries.binary_search(&(row, col)).is_ok()
    }

    /// Coordinates of `true` entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries.iter().copied()
    }

    /// Columns set in one row, ascending.
    pub fn row(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        let start = self.entries.partition_point(|&(r, _)| r < row);
        let end = self.entries.partition_point(|&(r, _)| r <= row);
        self.entries[start..end].iter().map(|&(_, c)| c)
    }

    pub fn to_dense(&self) -> Vec<Vec<bool>> {
        let mut dense = vec![vec![false; self.shape.1]; self.shape.0];
        for &(r, c) in &self.entries {
            dense[r][c] = true;
        }
        dense
    }

    pub fn transpose(&self) -> Self {
        let mut entries: Vec<(usize, usize)> = self.entries.iter().map(|&(r, c)| (c, r)).collect();
        entries.sort_unstable();
        Self {
            shape: (self.shape.1, self.shape.0),
            entries,
        }
    }
}

/// Collects per-block matrices into one matrix of `shape`.
///
/// Each block comes with the global row index of each of its rows and the global column
/// index of each of its columns.
#[derive(Debug)]
pub struct BlockAssembler {
    shape: (usize, usize),
    entries: Vec<(usize, usize)>,
    blocks: usize,
}

impl BlockAssembler {
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            shape,
            entries: Vec::new(),
            blocks: 0,
        }
    }

    /// Places `block` so that its entry `(r, c)` lands at `(rows[r], cols[c])`.
    pub fn place(&mut self, rows: &[usize], cols: &[usize], block: &SparseBoolMatrix) -> Result<()> {
        if block.shape() != (rows.len(), cols.len()) {
            return Err(Error::ShapeMismatch(format!(
                "block of shape {:?} placed at {} rows and {} columns",
                block.shape(),
                rows.len(),
                cols.len()
            )));
        }
        self.entries.reserve(block.nnz());
        for (r, c) in block.iter() {
            self.entries.push((rows[r], cols[c]));
        }
        self.blocks += 1;
        Ok(())
    }

    /// Number of blocks placed so far.
    pub fn block_count(&self) -> usize {
        self.blocks
    }

    pub fn finish(self) -> Result<SparseBoolMatrix> {
        SparseBoolMatrix::from_entries(self.shape, self.entries)
    }
}
