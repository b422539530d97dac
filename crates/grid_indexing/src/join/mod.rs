//! Chunk-aware overlap join.
//!
//! A [`DistributedIndex`] is built once over a chunked source grid. Each query against a
//! chunked target grid runs in four steps:
//!
//! 1. Every target chunk is materialized, checked and reduced to its boundary. The cells are
//!    dropped again; only the boundaries are kept.
//! 2. The source's coarse index turns each target boundary into a list of candidate source
//!    chunks. All other chunk pairs are pruned and become all-false blocks.
//! 3. Each target chunk with candidates is materialized once more and queried against the
//!    fine index of every candidate source chunk.
//! 4. The blocks are laid out by the global cell indices of both partitions.
//!
//! Steps 1 and 3 run on the configured [`Executor`]; step 4 waits for all of them. At most
//! one target chunk per running task is resident at a time.
use tracing::{info, warn};

use crate::config::JoinConfig;
use crate::engine::{OverlapIndex, RTreeEngine, SpatialEngine};
use crate::error::{Error, Result};
use crate::events::{EventSink, JoinEvent, JoinSummary};
use crate::executor::Executor;
use crate::grid::ChunkedGrid;
use crate::index::{handle_boundary, CoarseIndex, FineIndexCache};
use crate::sparse::BlockAssembler;

pub mod matrix;

pub use matrix::OverlapMatrix;

/// Two-level index over a chunked source grid.
pub struct DistributedIndex<E: SpatialEngine = RTreeEngine> {
    coarse: CoarseIndex<E::Index>,
    fine: FineIndexCache<E>,
    config: JoinConfig,
    executor: Executor,
}

impl DistributedIndex<RTreeEngine> {
    /// Indexes `source` with the default configuration.
    pub fn new(source: ChunkedGrid) -> Result<Self> {
        Self::with_config(source, JoinConfig::default())
    }

    /// Indexes `source` with R-tree engines.
    ///
    /// Chunk boundaries are always matched with [`crate::engine::OverlapPredicate::Intersects`],
    /// which never drops a pair the cell-level predicate in `config` could accept.
    pub fn with_config(source: ChunkedGrid, config: JoinConfig) -> Result<Self> {
        config.validate()?;
        let executor = Executor::from_threads(config.threads)?;
        let coarse = CoarseIndex::build(&RTreeEngine::default(), &source, &config, &executor)?;
        let engine = RTreeEngine::new(config.predicate);
        Ok(Self::from_parts(coarse, engine, source, config, executor))
    }
}

impl<E: SpatialEngine> DistributedIndex<E> {
    /// Indexes `source` with a custom engine used for both index levels.
    ///
    /// Pruning stays exact as long as two cells the engine reports as overlapping always make
    /// the engine report their chunk boundaries as overlapping too.
    pub fn with_engine(source: ChunkedGrid, engine: E, config: JoinConfig) -> Result<Self> {
        config.validate()?;
        let executor = Executor::from_threads(config.threads)?;
        let coarse = CoarseIndex::build(&engine, &source, &config, &executor)?;
        Ok(Self::from_parts(coarse, engine, source, config, executor))
    }

    fn from_parts(
        coarse: CoarseIndex<E::Index>,
        engine: E,
        source: ChunkedGrid,
        config: JoinConfig,
        executor: Executor,
    ) -> Self {
        info!(
            "Indexed source grid {} ({} chunks with cells).",
            source.partition(),
            coarse.indexed_chunks().len()
        );
        Self {
            coarse,
            fine: FineIndexCache::new(engine, source),
            config,
            executor,
        }
    }

    pub fn source(&self) -> &ChunkedGrid {
        self.fine.grid()
    }

    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    pub fn coarse_index(&self) -> &CoarseIndex<E::Index> {
        &self.coarse
    }

    pub fn fine_indices(&self) -> &FineIndexCache<E> {
        &self.fine
    }

    /// Computes which target cells overlap which source cells.
    pub fn query_overlap(&self, target: &ChunkedGrid) -> Result<OverlapMatrix> {
        self.query_overlap_with_events(target, &mut ())
    }

    /// Same as [`Self::query_overlap`], reporting progress to `sink`.
    ///
    /// Events are sent only after all blocks are computed; a failed query sends none.
    pub fn query_overlap_with_events(
        &self,
        target: &ChunkedGrid,
        sink: &mut dyn EventSink,
    ) -> Result<OverlapMatrix> {
        let source = self.source();
        let source_chunks = source.chunk_count();
        let target_chunks = target.chunk_count();
        info!(
            "Querying {} target chunks against {} source chunks.",
            target_chunks, source_chunks
        );

        // Step 1: target boundaries.
        let handles = (0..target_chunks)
            .map(|chunk| target.chunk_handle(chunk))
            .collect::<Result<Vec<_>>>()?;
        let boundaries = self
            .executor
            .map(|handle| handle_boundary(handle, &self.config), &handles)?;

        // Step 2: pruning.
        let candidates = self.coarse.candidates(&boundaries)?;
        let groups: Vec<(usize, &[usize])> = candidates
            .iter()
            .enumerate()
            .filter(|(_, sources)| !sources.is_empty())
            .map(|(t, sources)| (t, sources.as_slice()))
            .collect();

        // Step 3: fine queries, one task per target chunk with candidates.
        let computed = self.executor.map(
            |&(t, sources)| {
                let cells = handles[t].geometries().map_err(|e| e.in_chunk(t))?;
                self.executor.map(
                    |&s| {
                        self.fine
                            .index_for(s)
                            .and_then(|index| index.query_overlap(&cells))
                            .map_err(|e| e.in_pair(t, s))
                    },
                    sources,
                )
            },
            &groups,
        )?;

        // Step 4: layout.
        let target_rows = (0..target_chunks)
            .map(|t| target.partition().cell_indices(t))
            .collect::<Result<Vec<_>>>()?;
        let source_cols = (0..source_chunks)
            .map(|s| source.partition().cell_indices(s))
            .collect::<Result<Vec<_>>>()?;

        let shape = (target.total_cells(), source.total_cells());
        if shape.0 == 0 || shape.1 == 0 {
            warn!("Query result has no cells (shape {:?}).", shape);
        }
        let mut assembler = BlockAssembler::new(shape);
        let mut events = Vec::new();
        let mut computed = computed.into_iter().flatten();
        let mut summary = JoinSummary {
            shape,
            ..JoinSummary::default()
        };

        for (t, rows) in target_rows.iter().enumerate() {
            if handles[t].is_empty() {
                warn!("Target chunk {} has no cells.", t);
                events.push(JoinEvent::Warning {
                    context: format!("target chunk {t}"),
                    message: "chunk has no cells".into(),
                });
            }
            events.push(JoinEvent::CandidatesResolved {
                target_chunk: t,
                source_chunks: candidates[t].clone(),
            });

            for (s, cols) in source_cols.iter().enumerate() {
                let block_shape = (rows.len(), cols.len());
                let block = if candidates[t].binary_search(&s).is_ok() {
                    let block = computed.next().ok_or_else(|| {
                        Error::from("missing block for candidate pair").in_pair(t, s)
                    })?;
                    summary.computed_blocks += 1;
                    events.push(JoinEvent::BlockComputed {
                        target_chunk: t,
                        source_chunk: s,
                        shape: block_shape,
                        nnz: block.nnz(),
                    });
                    block
                } else {
                    summary.pruned_blocks += 1;
                    events.push(JoinEvent::BlockPruned {
                        target_chunk: t,
                        source_chunk: s,
                        shape: block_shape,
                    });
                    self.fine.engine().create_empty(block_shape)
                };
                assembler
                    .place(rows, cols, &block)
                    .map_err(|e| e.in_pair(t, s))?;
            }
        }

        let matrix = assembler.finish()?;
        summary.nnz = matrix.nnz();
        info!(
            "Query finished: {} blocks computed, {} pruned, {} overlapping cell pairs.",
            summary.computed_blocks, summary.pruned_blocks, summary.nnz
        );

        sink.send(JoinEvent::QueryStarted {
            source_chunks,
            target_chunks,
        });
        for event in events {
            sink.send(event);
        }
        sink.send(JoinEvent::QueryFinished { summary });

        Ok(OverlapMatrix::new(
            matrix,
            target.shape().to_vec(),
            source.shape().to_vec(),
            summary,
        ))
    }
}

/// Convenience wrapper: index `source` and query it with `target` in one call.
pub fn overlap(
    source: &ChunkedGrid,
    target: &ChunkedGrid,
    config: JoinConfig,
) -> Result<OverlapMatrix> {
    DistributedIndex::with_config(source.clone(), config)?.query_overlap(target)
}
