//! Coarse chunk boundaries.
//!
//! A boundary summarizes the spatial extent of every cell in a chunk with a single polygon.
//! It is only used to prune chunk pairs, so it must cover every cell but may cover more.
use geo::{BoundingRect, ConvexHull, MultiPoint, Point, Polygon};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shape used to summarize a chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoundaryStrategy {
    /// Convex hull of all cell vertices: tightest convex cover of the union.
    #[default]
    ConvexHull,
    /// Axis-aligned bounding rectangle of all cell vertices.
    Envelope,
}

/// Computes a polygon covering every cell in `cells`.
///
/// Fails with [`Error::EmptyChunk`] when `cells` is empty.
pub fn boundary_of(cells: &[Polygon<f64>], strategy: BoundaryStrategy) -> Result<Polygon<f64>> {
    if cells.is_empty() {
        return Err(Error::EmptyChunk);
    }

    let vertices: MultiPoint<f64> = cells
        .iter()
        .flat_map(|cell| cell.exterior().coords().copied())
        .map(Point::from)
        .collect();

    match strategy {
        BoundaryStrategy::ConvexHull => {
            let hull = vertices.convex_hull();
            // Collinear input collapses the hull to a segment.
            if hull.exterior().0.len() >= 4 {
                Ok(hull)
            } else {
                envelope_of(&vertices)
            }
        }
        BoundaryStrategy::Envelope => envelope_of(&vertices),
    }
}

fn envelope_of(vertices: &MultiPoint<f64>) -> Result<Polygon<f64>> {
    vertices
        .bounding_rect()
        .map(|rect| rect.to_polygon())
        .ok_or_else(|| Error::UnsupportedGeometry("chunk cells have no vertices".into()))
}
