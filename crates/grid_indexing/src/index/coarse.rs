//! Coarse index over chunk boundaries.
//!
//! The coarse index stores one boundary polygon per non-empty chunk of a grid and answers
//! which chunks can possibly overlap a given boundary. Entries are kept in flattened chunk
//! order, so a hit at coarse position `k` maps back to chunk `positions[k]`.
use geo::Polygon;
use tracing::{debug, warn};

use crate::config::{EmptyChunkPolicy, JoinConfig};
use crate::engine::{OverlapIndex, SpatialEngine};
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::geometry::{boundary_of, validate_polygon};
use crate::grid::{ChunkHandle, ChunkedGrid};

/// Checks a chunk's cells and computes its boundary.
///
/// Returns `None` for an empty chunk when `config` allows empty chunks. Errors are attributed
/// to `chunk`.
pub fn chunk_boundary(
    chunk: usize,
    cells: &[Polygon<f64>],
    config: &JoinConfig,
) -> Result<Option<Polygon<f64>>> {
    if cells.is_empty() {
        return match config.empty_chunks {
            EmptyChunkPolicy::Allow => Ok(None),
            EmptyChunkPolicy::Reject => Err(Error::EmptyChunk.in_chunk(chunk)),
        };
    }
    for (position, cell) in cells.iter().enumerate() {
        validate_polygon(cell, position).map_err(|e| e.in_chunk(chunk))?;
    }
    boundary_of(cells, config.boundary)
        .map(Some)
        .map_err(|e| e.in_chunk(chunk))
}

/// Materializes a chunk only long enough to compute its boundary.
pub(crate) fn handle_boundary(handle: &ChunkHandle, config: &JoinConfig) -> Result<Option<Polygon<f64>>> {
    let cells = handle.geometries().map_err(|e| e.in_chunk(handle.chunk()))?;
    chunk_boundary(handle.chunk(), &cells, config)
}

/// Boundaries of every chunk of `grid`, in flattened chunk order.
pub fn chunk_boundaries(
    grid: &ChunkedGrid,
    config: &JoinConfig,
    executor: &Executor,
) -> Result<Vec<Option<Polygon<f64>>>> {
    let handles = (0..grid.chunk_count())
        .map(|chunk| grid.chunk_handle(chunk))
        .collect::<Result<Vec<_>>>()?;
    executor.map(|handle| handle_boundary(handle, config), &handles)
}

/// Spatial index over the boundaries of a grid's chunks.
#[derive(Debug)]
pub struct CoarseIndex<I> {
    index: I,
    positions: Vec<usize>,
    chunk_count: usize,
}

impl<I: OverlapIndex> CoarseIndex<I> {
    /// Computes every chunk boundary of `grid` and indexes them with `engine`.
    ///
    /// Empty chunks have no boundary and are left out of the index; they can never be a
    /// candidate.
    pub fn build<E>(
        engine: &E,
        grid: &ChunkedGrid,
        config: &JoinConfig,
        executor: &Executor,
    ) -> Result<Self>
    where
        E: SpatialEngine<Index = I>,
    {
        let boundaries = chunk_boundaries(grid, config, executor)?;
        Self::from_boundaries(engine, boundaries)
    }

    /// Indexes precomputed boundaries, one per chunk in flattened order.
    pub fn from_boundaries<E>(engine: &E, boundaries: Vec<Option<Polygon<f64>>>) -> Result<Self>
    where
        E: SpatialEngine<Index = I>,
    {
        let chunk_count = boundaries.len();
        let mut positions = Vec::with_capacity(chunk_count);
        let mut polygons = Vec::with_capacity(chunk_count);
        for (chunk, boundary) in boundaries.into_iter().enumerate() {
            match boundary {
                Some(polygon) => {
                    positions.push(chunk);
                    polygons.push(polygon);
                }
                None => warn!("Chunk {} has no cells; leaving it out of the coarse index.", chunk),
            }
        }

        let index = engine.build_index(&polygons)?;
        debug!(
            "Built coarse index over {} of {} chunks.",
            positions.len(),
            chunk_count
        );
        Ok(Self {
            index,
            positions,
            chunk_count,
        })
    }

    /// Number of chunks of the indexed grid, including empty ones.
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Flattened positions of the chunks that have a boundary in the index.
    pub fn indexed_chunks(&self) -> &[usize] {
        &self.positions
    }

    /// For each query boundary, the ascending flattened positions of the indexed chunks whose
    /// boundary overlaps it. A `None` query has no candidates.
    pub fn candidates(&self, boundaries: &[Option<Polygon<f64>>]) -> Result<Vec<Vec<usize>>> {
        let mut rows = Vec::with_capacity(boundaries.len());
        let mut queries = Vec::with_capacity(boundaries.len());
        for (i, boundary) in boundaries.iter().enumerate() {
            if let Some(polygon) = boundary {
                rows.push(i);
                queries.push(polygon.clone());
            }
        }

        let mut candidates = vec![Vec::new(); boundaries.len()];
        if queries.is_empty() || self.index.is_empty() {
            return Ok(candidates);
        }
        let hits = self.index.query_overlap(&queries)?;
        for (row, col) in hits.iter() {
            candidates[rows[row]].push(self.positions[col]);
        }
        Ok(candidates)
    }
}
