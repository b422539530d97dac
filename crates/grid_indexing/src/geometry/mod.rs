//! Polygon handling shared by the indices: ragged encoding, chunk boundaries and input checks.
use geo::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line, Polygon};

use crate::error::{Error, Result};

pub mod boundary;
pub mod ragged;

pub use boundary::{boundary_of, BoundaryStrategy};
pub use ragged::RaggedPolygons;

/// Checks that a polygon is a simple, single closed ring with at least three distinct
/// vertices and finite coordinates.
///
/// Repeated consecutive vertices are tolerated. `position` is only used in error messages.
pub fn validate_polygon(polygon: &Polygon<f64>, position: usize) -> Result<()> {
    if !polygon.interiors().is_empty() {
        return Err(Error::UnsupportedGeometry(format!(
            "polygon {position} has {} interior rings; only single-ring polygons are supported",
            polygon.interiors().len()
        )));
    }
    let ring = &polygon.exterior().0;
    if let Some(c) = ring.iter().find(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(Error::UnsupportedGeometry(format!(
            "polygon {position} has a non-finite vertex ({}, {})",
            c.x, c.y
        )));
    }

    let mut vertices = ring.clone();
    vertices.dedup();
    // Closed ring: n vertices + repeated first vertex.
    if vertices.len() < 4 {
        return Err(Error::UnsupportedGeometry(format!(
            "polygon {position} has fewer than 3 vertices"
        )));
    }
    if let Some((a, b)) = crossing_edges(&vertices) {
        return Err(Error::UnsupportedGeometry(format!(
            "polygon {position} is not simple: edges {a} and {b} intersect"
        )));
    }
    Ok(())
}

/// First pair of ring edges that meet anywhere other than at their shared vertex.
fn crossing_edges(ring: &[Coord<f64>]) -> Option<(usize, usize)> {
    let edges: Vec<Line<f64>> = ring.windows(2).map(|w| Line::new(w[0], w[1])).collect();
    let n = edges.len();
    for i in 0..n {
        for j in i + 1..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(_) => return Some((i, j)),
            }
        }
    }
    None
}
