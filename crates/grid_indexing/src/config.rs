//! Configuration for building distributed indices and running joins.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::OverlapPredicate;
use crate::error::{Error, Result};
use crate::geometry::BoundaryStrategy;

/// How chunks without cells are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EmptyChunkPolicy {
    /// Empty chunks get no boundary and contribute zero-sized blocks.
    #[default]
    Allow,
    /// Empty chunks fail with [`Error::EmptyChunk`].
    Reject,
}

/// Configuration for a [`crate::join::DistributedIndex`].
#[non_exhaustive]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JoinConfig {
    /// Shape used for chunk boundaries in the coarse index.
    pub boundary: BoundaryStrategy,
    /// Exact overlap test used by the default engine.
    pub predicate: OverlapPredicate,
    /// Worker threads. `None` uses the global pool, `Some(1)` runs on the caller thread.
    pub threads: Option<usize>,
    /// Treatment of chunks without cells.
    pub empty_chunks: EmptyChunkPolicy,
}

impl JoinConfig {
    /// Creates a new [`JoinConfig`] with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the boundary strategy.
    pub fn with_boundary(mut self, boundary: BoundaryStrategy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Sets the overlap predicate.
    pub fn with_predicate(mut self, predicate: OverlapPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// Sets the number of worker threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Sets the empty chunk policy.
    pub fn with_empty_chunks(mut self, policy: EmptyChunkPolicy) -> Self {
        self.empty_chunks = policy;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(Error::InvalidConfig("threads must be > 0".into()));
        }
        Ok(())
    }
}
