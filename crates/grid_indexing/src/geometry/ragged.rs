//! Ragged (offset-based) polygon encoding.
//!
//! Polygons travel across the engine boundary as three flat arrays: interleaved 2-D
//! coordinates, ring start offsets into the coordinates, and geometry start offsets into the
//! rings. Only single-ring polygons are accepted.
use geo::{Coord, LineString, Polygon};

use crate::error::{Error, Result};

/// Polygons stored as flat coordinate and offset arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RaggedPolygons {
    coords: Vec<[f64; 2]>,
    ring_offsets: Vec<usize>,
    geometry_offsets: Vec<usize>,
}

impl RaggedPolygons {
    /// Validates and wraps the three arrays.
    ///
    /// `ring_offsets` must start at 0, be non-decreasing and end at `coords.len()`;
    /// `geometry_offsets` must do the same against the number of rings.
    pub fn try_new(
        coords: Vec<[f64; 2]>,
        ring_offsets: Vec<usize>,
        geometry_offsets: Vec<usize>,
    ) -> Result<Self> {
        check_offsets("ring", &ring_offsets, coords.len())?;
        check_offsets("geometry", &geometry_offsets, ring_offsets.len() - 1)?;
        Ok(Self {
            coords,
            ring_offsets,
            geometry_offsets,
        })
    }

    /// Encodes polygons, rejecting any that carry interior rings.
    pub fn from_polygons(polygons: &[Polygon<f64>]) -> Result<Self> {
        let mut coords = Vec::new();
        let mut ring_offsets = vec![0];
        let mut geometry_offsets = vec![0];

        for (i, polygon) in polygons.iter().enumerate() {
            if !polygon.interiors().is_empty() {
                return Err(Error::UnsupportedGeometry(format!(
                    "polygon {i} has {} interior rings; only single-ring polygons are supported",
                    polygon.interiors().len()
                )));
            }
            coords.extend(polygon.exterior().coords().map(|c| [c.x, c.y]));
            ring_offsets.push(coords.len());
            geometry_offsets.push(ring_offsets.len() - 1);
        }

        Ok(Self {
            coords,
            ring_offsets,
            geometry_offsets,
        })
    }

    pub fn coords(&self) -> &[[f64; 2]] {
        &self.coords
    }

    pub fn ring_offsets(&self) -> &[usize] {
        &self.ring_offsets
    }

    pub fn geometry_offsets(&self) -> &[usize] {
        &self.geometry_offsets
    }

    /// Number of encoded geometries.
    pub fn len(&self) -> usize {
        self.geometry_offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes every geometry into a [`Polygon`].
    pub fn to_polygons(&self) -> Result<Vec<Polygon<f64>>> {
        (0..self.len()).map(|g| self.polygon(g)).collect()
    }

    /// Decodes one geometry.
    pub fn polygon(&self, geometry: usize) -> Result<Polygon<f64>> {
        if geometry >= self.len() {
            return Err(Error::IndexOutOfRange {
                index: geometry,
                len: self.len(),
            });
        }

        let first_ring = self.geometry_offsets[geometry];
        let end_ring = self.geometry_offsets[geometry + 1];
        let rings = end_ring - first_ring;
        if rings != 1 {
            return Err(Error::UnsupportedGeometry(format!(
                "geometry {geometry} has {rings} rings; only single-ring polygons are supported"
            )));
        }

        let start = self.ring_offsets[first_ring];
        let end = self.ring_offsets[first_ring + 1];
        let ring = &self.coords[start..end];

        if let Some([x, y]) = ring.iter().find(|[x, y]| !x.is_finite() || !y.is_finite()) {
            return Err(Error::UnsupportedGeometry(format!(
                "geometry {geometry} has a non-finite vertex ({x}, {y})"
            )));
        }

        let closed = ring.len() > 1 && ring.first() == ring.last();
        let vertices = if closed { ring.len() - 1 } else { ring.len() };
        if vertices < 3 {
            return Err(Error::UnsupportedGeometry(format!(
                "geometry {geometry} has {vertices} vertices; a polygon needs at least 3"
            )));
        }

        let exterior: LineString<f64> = ring.iter().map(|&[x, y]| Coord { x, y }).collect();
        Ok(Polygon::new(exterior, vec![]))
    }
}

fn check_offsets(name: &str, offsets: &[usize], target_len: usize) -> Result<()> {
    match offsets.first() {
        Some(0) => {}
        Some(first) => {
            return Err(Error::UnsupportedGeometry(format!(
                "{name} offsets must start at 0, got {first}"
            )))
        }
        None => {
            return Err(Error::UnsupportedGeometry(format!(
                "{name} offsets must not be empty"
            )))
        }
    }
    if offsets.windows(2).any(|w| w[1] < w[0]) {
        return Err(Error::UnsupportedGeometry(format!(
            "{name} offsets must be non-decreasing"
        )));
    }
    let last = offsets[offsets.len() - 1];
    if last != target_len {
        return Err(Error::UnsupportedGeometry(format!(
            "{name} offsets end at {last}, expected {target_len}"
        )));
    }
    Ok(())
}
