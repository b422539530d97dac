#![forbid(unsafe_code)]
//! grid_indexing: Chunk-aware spatial joins between large polygon grids.
//!
//! Modules:
//! - chunking: chunk partitions of N-dimensional cell lattices
//! - geometry: ragged polygon encoding, chunk boundaries, input checks
//! - grid: cell sources, in-memory grids, chunked views and chunk handles
//! - engine: polygon index engines (R-tree backed by default)
//! - index: coarse (per-chunk boundary) and fine (per-chunk cell) indices
//! - join: the distributed overlap query and its result matrix
//! - sparse: sparse boolean matrices and block assembly
//! - config, executor, events, error: configuration, task execution, observation, errors
//!
//! The result of a join is exactly what a single index over all source cells would return
//! for all target cells; chunking only changes how much work is done to get there.
pub mod chunking;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod executor;
pub mod geometry;
pub mod grid;
pub mod index;
pub mod join;
pub mod sparse;

/// Convenient re-exports for common types. Import with `use grid_indexing::prelude::*;`.
pub mod prelude {
    pub use crate::chunking::{ChunkPartition, ChunkRegion};
    pub use crate::config::{EmptyChunkPolicy, JoinConfig};
    pub use crate::engine::{
        direct_overlap, OverlapIndex, OverlapPredicate, RTreeEngine, RTreeIndex, SpatialEngine,
    };
    pub use crate::error::{Error, Result};
    pub use crate::events::{EventSink, FnSink, JoinEvent, JoinSummary, VecSink};
    pub use crate::executor::Executor;
    pub use crate::geometry::{boundary_of, BoundaryStrategy, RaggedPolygons};
    pub use crate::grid::{CellSource, ChunkHandle, ChunkedGrid, FnGrid, Grid};
    pub use crate::index::{CoarseIndex, FineIndexCache};
    pub use crate::join::{overlap, DistributedIndex, OverlapMatrix};
    pub use crate::sparse::{BlockAssembler, SparseBoolMatrix};
}
