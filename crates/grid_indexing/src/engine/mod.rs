//! Polygon index engines.
//!
//! The join never tests geometry itself. It asks a [`SpatialEngine`] to build an
//! [`OverlapIndex`] over an ordered set of polygons and to answer overlap queries against it.
//! [`RTreeEngine`] is the bundled implementation.
use geo::{Intersects, Polygon, Relate};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sparse::SparseBoolMatrix;

pub mod rtree;

pub use rtree::{IndexedCell, RTreeEngine, RTreeIndex};

/// Geometric test deciding whether two polygons overlap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OverlapPredicate {
    /// Any shared point, including polygons that only touch along an edge or vertex.
    #[default]
    Intersects,
    /// Shared interior area; polygons that only touch are not overlapping.
    InteriorsIntersect,
}

impl OverlapPredicate {
    pub fn evaluate(self, a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
        match self {
            OverlapPredicate::Intersects => a.intersects(b),
            OverlapPredicate::InteriorsIntersect => {
                let matrix = a.relate(b);
                matrix.is_intersects() && !matrix.is_touches()
            }
        }
    }
}

/// An index over an ordered sequence of polygons.
pub trait OverlapIndex: Send + Sync {
    /// Number of indexed polygons.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a `(queries.len(), self.len())` matrix whose entry `(i, j)` is set iff query
    /// polygon `i` overlaps indexed polygon `j`.
    fn query_overlap(&self, queries: &[Polygon<f64>]) -> Result<SparseBoolMatrix>;
}

/// Builds [`OverlapIndex`]es.
pub trait SpatialEngine: Send + Sync {
    type Index: OverlapIndex;

    /// Indexes `polygons` in the given order. Fails with
    /// [`crate::error::Error::UnsupportedGeometry`] for anything but single-ring polygons.
    fn build_index(&self, polygons: &[Polygon<f64>]) -> Result<Self::Index>;

    /// All-false result of the given shape, used for pruned blocks.
    fn create_empty(&self, shape: (usize, usize)) -> SparseBoolMatrix {
        SparseBoolMatrix::empty(shape)
    }
}

/// Overlap of every target polygon with every source polygon through one index.
///
/// This is the non-chunked computation that the distributed join must reproduce.
pub fn direct_overlap<E: SpatialEngine>(
    engine: &E,
    source: &[Polygon<f64>],
    target: &[Polygon<f64>],
) -> Result<SparseBoolMatrix> {
    engine.build_index(source)?.query_overlap(target)
}
