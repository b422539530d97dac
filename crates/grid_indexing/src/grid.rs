//! Polygon grids and their chunked views.
//!
//! A grid is an immutable lattice of polygon cells. Implement [`CellSource`] to provide cells
//! on demand (for example from coordinate arrays that are too large to expand at once), or
//! use the in-memory [`Grid`]. [`ChunkedGrid`] pairs a source with a [`ChunkPartition`] and
//! hands out [`ChunkHandle`]s that materialize one chunk when asked.
use std::fmt;
use std::sync::Arc;

use geo::{LineString, Polygon};

use crate::chunking::{unravel_index, ChunkPartition, ChunkRegion};
use crate::error::{Error, Result};
use crate::geometry::RaggedPolygons;

/// Provider of the polygon cells of a lattice.
pub trait CellSource: Send + Sync {
    /// Cell counts per axis.
    fn shape(&self) -> &[usize];

    /// Cells of `region`, in region-local row-major order.
    fn materialize(&self, region: &ChunkRegion) -> Result<Vec<Polygon<f64>>>;
}

fn check_region(shape: &[usize], region: &ChunkRegion) -> Result<()> {
    if region.shape.len() != shape.len() || region.offset.len() != shape.len() {
        return Err(Error::ShapeMismatch(format!(
            "region has {} axes, grid has {}",
            region.shape.len(),
            shape.len()
        )));
    }
    for ((&offset, &extent), &n) in region.offset.iter().zip(&region.shape).zip(shape) {
        if offset + extent > n {
            return Err(Error::IndexOutOfRange {
                index: offset + extent,
                len: n,
            });
        }
    }
    Ok(())
}

/// In-memory grid with cells stored row-major.
#[derive(Clone, Debug)]
pub struct Grid {
    shape: Vec<usize>,
    cells: Arc<[Polygon<f64>]>,
}

impl Grid {
    /// Wraps `cells` laid out row-major over `shape`.
    pub fn new(shape: &[usize], cells: Vec<Polygon<f64>>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if cells.len() != expected {
            return Err(Error::ShapeMismatch(format!(
                "{} cells given for shape {shape:?} ({expected} cells)",
                cells.len()
            )));
        }
        Ok(Self {
            shape: shape.to_vec(),
            cells: cells.into(),
        })
    }

    /// One-dimensional grid over `cells`.
    pub fn from_polygons(cells: Vec<Polygon<f64>>) -> Self {
        Self {
            shape: vec![cells.len()],
            cells: cells.into(),
        }
    }

    /// Quadrilateral grid over a lattice of cell corners.
    ///
    /// `corners[j][i]` is the corner shared by cells `(j - 1, i - 1)` to `(j, i)`, so a lattice
    /// of `(ny + 1) x (nx + 1)` corners yields `ny x nx` cells. Curvilinear grids given by their
    /// corner coordinates use this directly.
    pub fn from_corners(corners: &[Vec<(f64, f64)>]) -> Result<Self> {
        let columns = corners.first().map_or(0, Vec::len);
        if corners.len() < 2 || columns < 2 {
            return Err(Error::ShapeMismatch(format!(
                "corner lattice of {} rows and {columns} columns has no cells",
                corners.len()
            )));
        }
        if let Some(row) = corners.iter().position(|row| row.len() != columns) {
            return Err(Error::ShapeMismatch(format!(
                "corner row {row} has {} corners, expected {columns}",
                corners[row].len()
            )));
        }

        let (ny, nx) = (corners.len() - 1, columns - 1);
        let mut cells = Vec::with_capacity(ny * nx);
        for j in 0..ny {
            for i in 0..nx {
                let ring = vec![
                    corners[j][i],
                    corners[j + 1][i],
                    corners[j + 1][i + 1],
                    corners[j][i + 1],
                ];
                cells.push(Polygon::new(LineString::from(ring), vec![]));
            }
        }
        Self::new(&[ny, nx], cells)
    }

    /// Axis-aligned grid between consecutive `x_edges` and `y_edges`.
    pub fn rectilinear(x_edges: &[f64], y_edges: &[f64]) -> Result<Self> {
        let corners: Vec<Vec<(f64, f64)>> = y_edges
            .iter()
            .map(|&y| x_edges.iter().map(|&x| (x, y)).collect())
            .collect();
        Self::from_corners(&corners)
    }

    /// Decodes ragged polygon arrays into a grid of `shape`.
    pub fn from_ragged(ragged: &RaggedPolygons, shape: &[usize]) -> Result<Self> {
        Self::new(shape, ragged.to_polygons()?)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Polygon<f64>] {
        &self.cells
    }

    /// Splits the grid into regular chunks of `chunk_shape` cells.
    pub fn chunked(self, chunk_shape: &[usize]) -> Result<ChunkedGrid> {
        let partition = ChunkPartition::from_uniform(&self.shape, chunk_shape)?;
        ChunkedGrid::new(Arc::new(self), partition)
    }

    /// Splits the grid using explicit per-axis chunk sizes.
    pub fn chunked_by(self, per_axis_chunk_sizes: Vec<Vec<usize>>) -> Result<ChunkedGrid> {
        let partition = ChunkPartition::from_chunk_description(&self.shape, per_axis_chunk_sizes)?;
        ChunkedGrid::new(Arc::new(self), partition)
    }
}

impl CellSource for Grid {
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn materialize(&self, region: &ChunkRegion) -> Result<Vec<Polygon<f64>>> {
        check_region(&self.shape, region)?;
        Ok(region
            .cell_indices(&self.shape)
            .into_iter()
            .map(|i| self.cells[i].clone())
            .collect())
    }
}

/// Grid whose cells are computed from their lattice index on every materialization.
pub struct FnGrid<F>
where
    F: Fn(&[usize]) -> Result<Polygon<f64>> + Send + Sync,
{
    shape: Vec<usize>,
    cell: F,
}

impl<F> FnGrid<F>
where
    F: Fn(&[usize]) -> Result<Polygon<f64>> + Send + Sync,
{
    pub fn new(shape: &[usize], cell: F) -> Self {
        Self {
            shape: shape.to_vec(),
            cell,
        }
    }
}

impl<F> CellSource for FnGrid<F>
where
    F: Fn(&[usize]) -> Result<Polygon<f64>> + Send + Sync,
{
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn materialize(&self, region: &ChunkRegion) -> Result<Vec<Polygon<f64>>> {
        check_region(&self.shape, region)?;
        region
            .cell_indices(&self.shape)
            .into_iter()
            .map(|i| (self.cell)(&unravel_index(i, &self.shape)))
            .collect()
    }
}

/// A cell source split into chunks.
#[derive(Clone)]
pub struct ChunkedGrid {
    source: Arc<dyn CellSource>,
    partition: ChunkPartition,
}

impl ChunkedGrid {
    /// Pairs `source` with `partition`; both must describe the same lattice shape.
    pub fn new(source: Arc<dyn CellSource>, partition: ChunkPartition) -> Result<Self> {
        if source.shape() != partition.global_shape() {
            return Err(Error::ShapeMismatch(format!(
                "grid shape {:?} does not match partition shape {:?}",
                source.shape(),
                partition.global_shape()
            )));
        }
        Ok(Self { source, partition })
    }

    pub fn partition(&self) -> &ChunkPartition {
        &self.partition
    }

    pub fn shape(&self) -> &[usize] {
        self.partition.global_shape()
    }

    pub fn chunk_count(&self) -> usize {
        self.partition.chunk_count()
    }

    pub fn total_cells(&self) -> usize {
        self.partition.total_cells()
    }

    /// Same cells under a different chunk layout.
    pub fn rechunk(&self, partition: ChunkPartition) -> Result<Self> {
        Self::new(self.source.clone(), partition)
    }

    /// Lazy reference to one chunk's cells. Nothing is computed until
    /// [`ChunkHandle::geometries`] is called.
    pub fn chunk_handle(&self, flattened_chunk_index: usize) -> Result<ChunkHandle> {
        Ok(ChunkHandle {
            source: self.source.clone(),
            chunk: flattened_chunk_index,
            region: self.partition.region(flattened_chunk_index)?,
        })
    }

    /// Materializes one chunk's cells.
    pub fn chunk_geometries(&self, flattened_chunk_index: usize) -> Result<Vec<Polygon<f64>>> {
        self.chunk_handle(flattened_chunk_index)?.geometries()
    }
}

impl fmt::Debug for ChunkedGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedGrid")
            .field("partition", &self.partition)
            .finish_non_exhaustive()
    }
}

/// Shared, lazily evaluated reference to one chunk of a grid.
#[derive(Clone)]
pub struct ChunkHandle {
    source: Arc<dyn CellSource>,
    chunk: usize,
    region: ChunkRegion,
}

impl ChunkHandle {
    /// Flattened chunk position.
    pub fn chunk(&self) -> usize {
        self.chunk
    }

    pub fn region(&self) -> &ChunkRegion {
        &self.region
    }

    /// Number of cells in the chunk.
    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// Computes the chunk's cells.
    pub fn geometries(&self) -> Result<Vec<Polygon<f64>>> {
        self.source.materialize(&self.region)
    }
}

impl fmt::Debug for ChunkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkHandle")
            .field("chunk", &self.chunk)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}
