//! The two index levels of a chunked grid.
//!
//! - [`CoarseIndex`]: one boundary per chunk, used to prune chunk pairs.
//! - [`FineIndexCache`]: one index per chunk over its actual cells, built on demand.
pub mod coarse;
pub mod fine;

pub(crate) use coarse::handle_boundary;
pub use coarse::{chunk_boundaries, chunk_boundary, CoarseIndex};
pub use fine::FineIndexCache;
