//! Chunk layout of cell lattices.
//!
//! [`ChunkPartition`] divides a lattice into rectangular chunks and maps flattened chunk
//! positions to the [`ChunkRegion`] they cover.
pub mod partition;
pub mod region;

pub use partition::ChunkPartition;
pub use region::{ravel_index, row_major_strides, unravel_index, ChunkRegion};
