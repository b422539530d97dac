//! R-tree backed engine.
//!
//! Polygons are bulk-loaded into an [`rstar::RTree`] keyed by their bounding boxes. A query
//! loads the query polygons into a second tree, walks both trees together to collect pairs
//! with intersecting boxes, and refines each pair with the exact [`OverlapPredicate`].
use geo::{BoundingRect, Polygon};
use rstar::{RTree, RTreeObject, AABB};

use super::{OverlapIndex, OverlapPredicate, SpatialEngine};
use crate::error::{Error, Result};
use crate::geometry::validate_polygon;
use crate::sparse::SparseBoolMatrix;

/// A polygon tagged with its position in the indexed sequence.
#[derive(Clone, Debug)]
pub struct IndexedCell {
    index: usize,
    polygon: Polygon<f64>,
    envelope: AABB<[f64; 2]>,
}

impl IndexedCell {
    pub fn new(index: usize, polygon: Polygon<f64>) -> Result<Self> {
        validate_polygon(&polygon, index)?;
        let rect = polygon.bounding_rect().ok_or_else(|| {
            Error::UnsupportedGeometry(format!("polygon {index} has no bounding box"))
        })?;
        let envelope = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        Ok(Self {
            index,
            polygon,
            envelope,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn geometry(&self) -> &Polygon<f64> {
        &self.polygon
    }
}

impl RTreeObject for IndexedCell {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Engine producing [`RTreeIndex`]es.
#[derive(Clone, Copy, Debug, Default)]
pub struct RTreeEngine {
    predicate: OverlapPredicate,
}

impl RTreeEngine {
    pub fn new(predicate: OverlapPredicate) -> Self {
        Self { predicate }
    }

    pub fn predicate(&self) -> OverlapPredicate {
        self.predicate
    }
}

impl SpatialEngine for RTreeEngine {
    type Index = RTreeIndex;

    fn build_index(&self, polygons: &[Polygon<f64>]) -> Result<RTreeIndex> {
        let cells = index_cells(polygons)?;
        Ok(RTreeIndex {
            len: cells.len(),
            tree: RTree::bulk_load(cells),
            predicate: self.predicate,
        })
    }
}

/// R-tree over one ordered polygon sequence.
#[derive(Debug)]
pub struct RTreeIndex {
    tree: RTree<IndexedCell>,
    len: usize,
    predicate: OverlapPredicate,
}

impl OverlapIndex for RTreeIndex {
    fn len(&self) -> usize {
        self.len
    }

    fn query_overlap(&self, queries: &[Polygon<f64>]) -> Result<SparseBoolMatrix> {
        let shape = (queries.len(), self.len);
        let query_cells = index_cells(queries)?;
        if query_cells.is_empty() || self.len == 0 {
            return Ok(SparseBoolMatrix::empty(shape));
        }

        let query_tree = RTree::bulk_load(query_cells);
        let entries: Vec<(usize, usize)> = self
            .tree
            .intersection_candidates_with_other_tree(&query_tree)
            .filter(|(indexed, query)| self.predicate.evaluate(&query.polygon, &indexed.polygon))
            .map(|(indexed, query)| (query.index, indexed.index))
            .collect();

        SparseBoolMatrix::from_entries(shape, entries)
    }
}

fn index_cells(polygons: &[Polygon<f64>]) -> Result<Vec<IndexedCell>> {
    polygons
        .iter()
        .enumerate()
        .map(|(i, p)| IndexedCell::new(i, p.clone()))
        .collect()
}
