//! Per-chunk fine indices, built on first use.
use std::sync::OnceLock;

use tracing::debug;

use crate::engine::{OverlapIndex, SpatialEngine};
use crate::error::{Error, Result};
use crate::grid::ChunkedGrid;

/// Arena of fine indices keyed by flattened chunk position.
///
/// Each slot is filled at most once. Two threads asking for the same unbuilt chunk may both
/// build it; one result is kept and the other dropped.
pub struct FineIndexCache<E: SpatialEngine> {
    engine: E,
    grid: ChunkedGrid,
    slots: Vec<OnceLock<E::Index>>,
}

impl<E: SpatialEngine> FineIndexCache<E> {
    pub fn new(engine: E, grid: ChunkedGrid) -> Self {
        let slots = (0..grid.chunk_count()).map(|_| OnceLock::new()).collect();
        Self { engine, grid, slots }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn grid(&self) -> &ChunkedGrid {
        &self.grid
    }

    /// Number of chunks the cache can hold.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the fine index of one chunk, materializing the chunk and building the index if
    /// this is the first request for it.
    pub fn index_for(&self, flattened_chunk_index: usize) -> Result<&E::Index> {
        let slot = self
            .slots
            .get(flattened_chunk_index)
            .ok_or(Error::IndexOutOfRange {
                index: flattened_chunk_index,
                len: self.slots.len(),
            })?;
        if let Some(index) = slot.get() {
            return Ok(index);
        }

        let cells = self
            .grid
            .chunk_geometries(flattened_chunk_index)
            .map_err(|e| e.in_chunk(flattened_chunk_index))?;
        let index = self
            .engine
            .build_index(&cells)
            .map_err(|e| e.in_chunk(flattened_chunk_index))?;
        debug!(
            "Built fine index for chunk {} ({} cells).",
            flattened_chunk_index,
            index.len()
        );
        Ok(slot.get_or_init(|| index))
    }

    /// Whether the index of a chunk has been built.
    pub fn is_built(&self, flattened_chunk_index: usize) -> bool {
        self.slots
            .get(flattened_chunk_index)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of chunks whose index has been built.
    pub fn built_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use geo::{LineString, Polygon};

    use super::*;
    use crate::chunking::ChunkPartition;
    use crate::engine::RTreeEngine;
    use crate::executor::Executor;
    use crate::grid::FnGrid;

    fn unit_square(x: f64, y: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x, y), (x, y + 1.0), (x + 1.0, y + 1.0), (x + 1.0, y)]),
            vec![],
        )
    }

    fn counted_grid(calls: Arc<AtomicUsize>) -> ChunkedGrid {
        let source = FnGrid::new(&[4, 4], move |idx: &[usize]| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(unit_square(idx[1] as f64, idx[0] as f64))
        });
        let partition = ChunkPartition::from_uniform(&[4, 4], &[2, 2]).unwrap();
        ChunkedGrid::new(Arc::new(source), partition).unwrap()
    }

    #[test]
    fn builds_each_chunk_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = FineIndexCache::new(RTreeEngine::default(), counted_grid(calls.clone()));
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.built_count(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let index = cache.index_for(2).unwrap();
        assert_eq!(index.len(), 4);
        assert!(cache.is_built(2));
        assert!(!cache.is_built(0));
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        cache.index_for(2).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(cache.built_count(), 1);
    }

    #[test]
    fn concurrent_requests_share_one_slot() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = FineIndexCache::new(RTreeEngine::default(), counted_grid(calls));
        let requests = vec![1usize; 16];
        let lens = Executor::multi_thread(4)
            .unwrap()
            .map(|&chunk| cache.index_for(chunk).map(|index| index.len()), &requests)
            .unwrap();
        assert!(lens.iter().all(|&len| len == 4));
        assert_eq!(cache.built_count(), 1);
    }

    #[test]
    fn failed_builds_leave_the_slot_empty() {
        let source = FnGrid::new(&[2], |idx: &[usize]| {
            if idx[0] == 1 {
                Err(Error::Other("cell unavailable".into()))
            } else {
                Ok(unit_square(0.0, 0.0))
            }
        });
        let partition = ChunkPartition::from_uniform(&[2], &[1]).unwrap();
        let grid = ChunkedGrid::new(Arc::new(source), partition).unwrap();
        let cache = FineIndexCache::new(RTreeEngine::default(), grid);

        let err = cache.index_for(1).unwrap_err();
        assert!(matches!(err, Error::Chunk { chunk: 1, .. }));
        assert!(!cache.is_built(1));
        assert!(cache.index_for(0).is_ok());
    }

    #[test]
    fn out_of_range_chunk_is_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = FineIndexCache::new(RTreeEngine::default(), counted_grid(calls));
        assert!(matches!(
            cache.index_for(4),
            Err(Error::IndexOutOfRange { index: 4, len: 4 })
        ));
        assert!(!cache.is_built(4));
    }
}
