#![allow(dead_code)]

use geo::{LineString, Polygon};
use grid_indexing::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn quad(points: [(f64, f64); 4]) -> Polygon<f64> {
    Polygon::new(LineString::from(points.to_vec()), vec![])
}

/// `ny` x `nx` axis-aligned cells of size `dx` x `dy` starting at `origin`.
pub fn rectilinear(ny: usize, nx: usize, origin: (f64, f64), dx: f64, dy: f64) -> Grid {
    let x_edges: Vec<f64> = (0..=nx).map(|i| origin.0 + i as f64 * dx).collect();
    let y_edges: Vec<f64> = (0..=ny).map(|j| origin.1 + j as f64 * dy).collect();
    Grid::rectilinear(&x_edges, &y_edges).expect("at least one cell per axis")
}

fn unit(rng: &mut StdRng) -> f64 {
    (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

/// Curvilinear grid over unit cells whose shared vertices are moved by up to
/// `jitter / 2` along each axis. Neighbouring cells still tile the plane.
pub fn jittered(ny: usize, nx: usize, jitter: f64, seed: u64) -> Grid {
    let mut rng = StdRng::seed_from_u64(seed);
    let corners: Vec<Vec<(f64, f64)>> = (0..=ny)
        .map(|j| {
            (0..=nx)
                .map(|i| {
                    let dx = (unit(&mut rng) - 0.5) * jitter;
                    let dy = (unit(&mut rng) - 0.5) * jitter;
                    (i as f64 + dx, j as f64 + dy)
                })
                .collect()
        })
        .collect();
    Grid::from_corners(&corners).expect("at least one cell per axis")
}

/// Overlap computed by one index over all source cells.
pub fn reference(source: &Grid, target: &Grid, predicate: OverlapPredicate) -> SparseBoolMatrix {
    direct_overlap(&RTreeEngine::new(predicate), source.cells(), target.cells())
        .expect("reference overlap")
}

/// Whether `matrix` has any entry in the block spanned by the given global indices.
pub fn block_has_entries(matrix: &SparseBoolMatrix, rows: &[usize], cols: &[usize]) -> bool {
    rows.iter()
        .any(|&r| matrix.row(r).any(|c| cols.binary_search(&c).is_ok()))
}
