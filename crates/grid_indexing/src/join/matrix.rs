//! Result of a distributed overlap query.
use crate::chunking::{ravel_index, unravel_index};
use crate::error::{Error, Result};
use crate::events::JoinSummary;
use crate::sparse::SparseBoolMatrix;

/// Sparse overlap matrix addressed by flattened global target and source cell indices.
///
/// Entry `(r, c)` is set iff target cell `r` overlaps source cell `c`. The lattice shapes of
/// both grids are kept so flattened indices can be translated back into cell coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlapMatrix {
    matrix: SparseBoolMatrix,
    target_shape: Vec<usize>,
    source_shape: Vec<usize>,
    summary: JoinSummary,
}

impl OverlapMatrix {
    pub(crate) fn new(
        matrix: SparseBoolMatrix,
        target_shape: Vec<usize>,
        source_shape: Vec<usize>,
        summary: JoinSummary,
    ) -> Self {
        Self {
            matrix,
            target_shape,
            source_shape,
            summary,
        }
    }

    /// `(total target cells, total source cells)`.
    pub fn shape(&self) -> (usize, usize) {
        self.matrix.shape()
    }

    /// Target lattice shape followed by source lattice shape.
    pub fn nd_shape(&self) -> Vec<usize> {
        self.target_shape
            .iter()
            .chain(&self.source_shape)
            .copied()
            .collect()
    }

    pub fn target_shape(&self) -> &[usize] {
        &self.target_shape
    }

    pub fn source_shape(&self) -> &[usize] {
        &self.source_shape
    }

    pub fn get(&self, target_cell: usize, source_cell: usize) -> bool {
        self.matrix.get(target_cell, source_cell)
    }

    /// Looks up an entry by lattice coordinates.
    pub fn get_nd(&self, target_cell: &[usize], source_cell: &[usize]) -> Result<bool> {
        let row = ravel_index(target_cell, &self.target_shape)?;
        let col = ravel_index(source_cell, &self.source_shape)?;
        Ok(self.matrix.get(row, col))
    }

    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// `(target cell, source cell)` pairs that overlap, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.matrix.iter()
    }

    /// Source cells overlapping one target cell, ascending.
    pub fn overlaps_of(&self, target_cell: usize) -> impl Iterator<Item = usize> + '_ {
        self.matrix.row(target_cell)
    }

    pub fn to_dense(&self) -> Vec<Vec<bool>> {
        self.matrix.to_dense()
    }

    pub fn matrix(&self) -> &SparseBoolMatrix {
        &self.matrix
    }

    pub fn into_matrix(self) -> SparseBoolMatrix {
        self.matrix
    }

    /// Lattice coordinates of a flattened target cell index.
    pub fn unravel_target(&self, target_cell: usize) -> Result<Vec<usize>> {
        unravel_checked(target_cell, &self.target_shape)
    }

    /// Lattice coordinates of a flattened source cell index.
    pub fn unravel_source(&self, source_cell: usize) -> Result<Vec<usize>> {
        unravel_checked(source_cell, &self.source_shape)
    }

    /// Counters of the query that produced this matrix.
    pub fn summary(&self) -> &JoinSummary {
        &self.summary
    }
}

fn unravel_checked(flat: usize, shape: &[usize]) -> Result<Vec<usize>> {
    let len: usize = shape.iter().product();
    if flat >= len {
        return Err(Error::IndexOutOfRange { index: flat, len });
    }
    Ok(unravel_index(flat, shape))
}
