//! Event types and sinks for observing joins.
//!
//! [`JoinEvent`]s report the pruning decisions and block results of
//! [`crate::join::DistributedIndex::query_overlap_with_events`]. Events are delivered on the
//! calling thread after the parallel phase, ordered by target chunk and then source chunk.

/// Counters describing one finished join.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JoinSummary {
    /// Blocks computed through a fine index.
    pub computed_blocks: usize,
    /// Blocks synthesized as all-false without touching geometry.
    pub pruned_blocks: usize,
    /// Number of overlapping cell pairs.
    pub nnz: usize,
    /// `(target cells, source cells)`.
    pub shape: (usize, usize),
}

impl JoinSummary {
    /// Total number of blocks in the result.
    pub fn total_blocks(&self) -> usize {
        self.computed_blocks + self.pruned_blocks
    }

    /// Fraction of blocks that needed no fine query.
    pub fn pruned_fraction(&self) -> f64 {
        match self.total_blocks() {
            0 => 0.0,
            n => self.pruned_blocks as f64 / n as f64,
        }
    }
}

/// Describes events emitted by a join.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum JoinEvent {
    /// Emitted when a query starts.
    QueryStarted {
        /// Number of chunks of the indexed grid.
        source_chunks: usize,
        /// Number of chunks of the query grid.
        target_chunks: usize,
    },

    /// Emitted once per target chunk with the source chunks its boundary overlaps.
    CandidatesResolved {
        target_chunk: usize,
        source_chunks: Vec<usize>,
    },

    /// Emitted for a block that was synthesized as all-false.
    BlockPruned {
        target_chunk: usize,
        source_chunk: usize,
        /// Block shape `(target cells, source cells)`.
        shape: (usize, usize),
    },

    /// Emitted for a block computed through the source chunk's fine index.
    BlockComputed {
        target_chunk: usize,
        source_chunk: usize,
        /// Block shape `(target cells, source cells)`.
        shape: (usize, usize),
        /// Overlapping cell pairs in the block.
        nnz: usize,
    },

    /// Emitted when the result has been assembled.
    QueryFinished { summary: JoinSummary },

    /// Non-fatal warning generated during the join.
    Warning {
        /// Context string (e.g. chunk position).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Receiver of [`JoinEvent`]s. A query holds the sink mutably for its whole duration.
pub trait EventSink {
    fn send(&mut self, event: JoinEvent);
}

/// Discards every event.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: JoinEvent) {}
}

/// Forwards each event to a closure, e.g. to log progress as blocks complete.
pub struct FnSink<F: FnMut(JoinEvent)>(F);

impl<F: FnMut(JoinEvent)> FnSink<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F: FnMut(JoinEvent)> EventSink for FnSink<F> {
    #[inline]
    fn send(&mut self, event: JoinEvent) {
        (self.0)(event);
    }
}

/// Records every event in delivery order.
#[derive(Debug, Default)]
pub struct VecSink {
    events: Vec<JoinEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[JoinEvent] {
        &self.events
    }

    pub fn into_inner(self) -> Vec<JoinEvent> {
        self.events
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: JoinEvent) {
        self.events.push(event);
    }
}
