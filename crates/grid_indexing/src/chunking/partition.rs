//! Chunk layout of an N-dimensional cell lattice.
//!
//! A [`ChunkPartition`] records, per axis, the cell count of every chunk along that axis.
//! Chunks are addressed either by their multi-index on the chunk grid or by the row-major
//! flattened position of that multi-index, which is the order used by every index built
//! on top of the partition.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::region::{ravel_index, unravel_index, ChunkRegion};
use crate::error::{Error, Result};

/// Describes how a lattice of `global_shape` cells is divided into rectangular chunks.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChunkPartition {
    global_shape: Vec<usize>,
    chunk_sizes: Vec<Vec<usize>>,
}

impl ChunkPartition {
    /// Builds a partition from explicit per-axis chunk sizes.
    ///
    /// Fails with [`Error::ShapeMismatch`] when the number of axes differs from
    /// `global_shape` or when the chunk sizes of an axis do not sum to its extent.
    pub fn from_chunk_description(
        global_shape: &[usize],
        per_axis_chunk_sizes: Vec<Vec<usize>>,
    ) -> Result<Self> {
        if per_axis_chunk_sizes.len() != global_shape.len() {
            return Err(Error::ShapeMismatch(format!(
                "chunk sizes given for {} axes, grid has {}",
                per_axis_chunk_sizes.len(),
                global_shape.len()
            )));
        }
        for (axis, (sizes, &extent)) in per_axis_chunk_sizes.iter().zip(global_shape).enumerate() {
            let total: usize = sizes.iter().sum();
            if total != extent {
                return Err(Error::ShapeMismatch(format!(
                    "chunk sizes along axis {axis} sum to {total}, expected {extent}"
                )));
            }
        }

        Ok(Self {
            global_shape: global_shape.to_vec(),
            chunk_sizes: per_axis_chunk_sizes,
        })
    }

    /// Builds a regular partition with `chunk_shape` cells per chunk, leaving a smaller
    /// remainder chunk at the end of any axis that does not divide evenly.
    pub fn from_uniform(global_shape: &[usize], chunk_shape: &[usize]) -> Result<Self> {
        if chunk_shape.len() != global_shape.len() {
            return Err(Error::ShapeMismatch(format!(
                "chunk shape has {} axes, grid has {}",
                chunk_shape.len(),
                global_shape.len()
            )));
        }

        let mut per_axis = Vec::with_capacity(global_shape.len());
        for (axis, (&extent, &step)) in global_shape.iter().zip(chunk_shape).enumerate() {
            if step == 0 && extent > 0 {
                return Err(Error::InvalidConfig(format!(
                    "chunk size along axis {axis} must be > 0"
                )));
            }
            let mut sizes = Vec::new();
            let mut remaining = extent;
            while remaining > 0 {
                let size = step.min(remaining);
                sizes.push(size);
                remaining -= size;
            }
            per_axis.push(sizes);
        }

        Self::from_chunk_description(global_shape, per_axis)
    }

    /// A partition holding the whole lattice in one chunk.
    pub fn single(global_shape: &[usize]) -> Self {
        Self {
            global_shape: global_shape.to_vec(),
            chunk_sizes: global_shape.iter().map(|&n| vec![n]).collect(),
        }
    }

    /// Cell counts of the whole lattice per axis.
    pub fn global_shape(&self) -> &[usize] {
        &self.global_shape
    }

    /// Chunk sizes per axis.
    pub fn chunk_sizes(&self) -> &[Vec<usize>] {
        &self.chunk_sizes
    }

    /// Number of chunks per axis.
    pub fn grid_shape(&self) -> Vec<usize> {
        self.chunk_sizes.iter().map(Vec::len).collect()
    }

    /// Total number of chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunk_sizes.iter().map(Vec::len).product()
    }

    /// Total number of cells.
    pub fn total_cells(&self) -> usize {
        self.global_shape.iter().product()
    }

    /// Chunk multi-index for a flattened chunk position.
    pub fn unravel(&self, flattened_chunk_index: usize) -> Result<Vec<usize>> {
        self.check(flattened_chunk_index)?;
        Ok(unravel_index(flattened_chunk_index, &self.grid_shape()))
    }

    /// Flattened chunk position for a chunk multi-index.
    pub fn ravel(&self, chunk_index: &[usize]) -> Result<usize> {
        ravel_index(chunk_index, &self.grid_shape())
    }

    /// Cell counts of one chunk along every axis.
    pub fn chunk_shape(&self, flattened_chunk_index: usize) -> Result<Vec<usize>> {
        let multi = self.unravel(flattened_chunk_index)?;
        Ok(multi
            .iter()
            .zip(&self.chunk_sizes)
            .map(|(&i, sizes)| sizes[i])
            .collect())
    }

    /// Number of cells in one chunk.
    pub fn chunk_cell_count(&self, flattened_chunk_index: usize) -> Result<usize> {
        Ok(self.chunk_shape(flattened_chunk_index)?.iter().product())
    }

    /// Lattice block covered by one chunk.
    pub fn region(&self, flattened_chunk_index: usize) -> Result<ChunkRegion> {
        let multi = self.unravel(flattened_chunk_index)?;
        let mut offset = Vec::with_capacity(multi.len());
        let mut shape = Vec::with_capacity(multi.len());
        for (&i, sizes) in multi.iter().zip(&self.chunk_sizes) {
            offset.push(sizes[..i].iter().sum());
            shape.push(sizes[i]);
        }
        Ok(ChunkRegion::new(offset, shape))
    }

    /// Global flattened indices of a chunk's cells, in chunk-local row-major order.
    pub fn cell_indices(&self, flattened_chunk_index: usize) -> Result<Vec<usize>> {
        Ok(self
            .region(flattened_chunk_index)?
            .cell_indices(&self.global_shape))
    }

    fn check(&self, flattened_chunk_index: usize) -> Result<()> {
        let len = self.chunk_count();
        if flattened_chunk_index >= len {
            return Err(Error::IndexOutOfRange {
                index: flattened_chunk_index,
                len,
            });
        }
        Ok(())
    }
}

impl fmt::Display for ChunkPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChunkPartition(shape={:?}, chunks={})",
            self.global_shape,
            self.chunk_count()
        )
    }
}
