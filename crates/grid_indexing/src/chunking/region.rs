//! Rectangular sub-blocks of an N-dimensional cell lattice.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A rectangular block of lattice positions, given by its lower corner and extent per axis.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChunkRegion {
    /// Lattice position of the first cell along each axis.
    pub offset: Vec<usize>,
    /// Cell count along each axis.
    pub shape: Vec<usize>,
}

impl ChunkRegion {
    pub fn new(offset: Vec<usize>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(offset.len(), shape.len(), "offset and shape rank differ");
        Self { offset, shape }
    }

    /// Region covering an entire lattice of the given shape.
    pub fn full(shape: &[usize]) -> Self {
        Self::new(vec![0; shape.len()], shape.to_vec())
    }

    /// Number of cells in the region.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Global row-major flattened indices of the region's cells, visited in
    /// region-local row-major order.
    pub fn cell_indices(&self, global_shape: &[usize]) -> Vec<usize> {
        debug_assert_eq!(global_shape.len(), self.shape.len(), "rank mismatch");
        let len = self.len();
        let mut out = Vec::with_capacity(len);
        if len == 0 {
            return out;
        }

        let strides = row_major_strides(global_shape);
        let base: usize = self
            .offset
            .iter()
            .zip(&strides)
            .map(|(o, s)| o * s)
            .sum();

        let mut local = vec![0usize; self.shape.len()];
        for _ in 0..len {
            let flat: usize = local.iter().zip(&strides).map(|(l, s)| l * s).sum();
            out.push(base + flat);
            // Odometer increment, last axis fastest.
            for axis in (0..local.len()).rev() {
                local[axis] += 1;
                if local[axis] < self.shape[axis] {
                    break;
                }
                local[axis] = 0;
            }
        }
        out
    }
}

/// Row-major strides for a lattice shape.
pub fn row_major_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

/// Row-major flattened position of a multi-index within `shape`.
pub fn ravel_index(index: &[usize], shape: &[usize]) -> Result<usize> {
    if index.len() != shape.len() {
        return Err(Error::ShapeMismatch(format!(
            "index has {} axes, shape has {}",
            index.len(),
            shape.len()
        )));
    }
    let mut flat = 0;
    for ((&i, &n), stride) in index.iter().zip(shape).zip(row_major_strides(shape)) {
        if i >= n {
            return Err(Error::IndexOutOfRange { index: i, len: n });
        }
        flat += i * stride;
    }
    Ok(flat)
}

/// Splits a row-major flattened index into a multi-index for `shape`.
///
/// The caller guarantees `flat < shape.iter().product()`.
pub fn unravel_index(flat: usize, shape: &[usize]) -> Vec<usize> {
    let mut rest = flat;
    let mut out = vec![0usize; shape.len()];
    for axis in (0..shape.len()).rev() {
        let extent = shape[axis].max(1);
        out[axis] = rest % extent;
        rest /= extent;
    }
    out
}
