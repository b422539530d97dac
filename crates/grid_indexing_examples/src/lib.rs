#![forbid(unsafe_code)]
//! Shared helpers for the grid_indexing example binaries.
use geo::{LineString, Polygon};
use grid_indexing::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Installs a `fmt` subscriber honouring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn quad(points: [(f64, f64); 4]) -> Polygon<f64> {
    Polygon::new(LineString::from(points.to_vec()), vec![])
}

/// `ny` x `nx` axis-aligned cells of `cell_size` starting at `origin`.
pub fn rectilinear_grid(
    ny: usize,
    nx: usize,
    origin: (f64, f64),
    cell_size: (f64, f64),
) -> Result<Grid> {
    let (dx, dy) = cell_size;
    let x_edges: Vec<f64> = (0..=nx).map(|i| origin.0 + i as f64 * dx).collect();
    let y_edges: Vec<f64> = (0..=ny).map(|j| origin.1 + j as f64 * dy).collect();
    Grid::rectilinear(&x_edges, &y_edges)
}

/// Curvilinear grid of unit cells whose shared corners are displaced by up to
/// `jitter / 2` along each axis.
pub fn jittered_grid(ny: usize, nx: usize, jitter: f64, seed: u64) -> Result<Grid> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut corners = vec![Vec::with_capacity(nx + 1); ny + 1];
    for (j, row) in corners.iter_mut().enumerate() {
        for i in 0..=nx {
            let dx = (unit(&mut rng) - 0.5) * jitter;
            let dy = (unit(&mut rng) - 0.5) * jitter;
            row.push((i as f64 + dx, j as f64 + dy));
        }
    }
    Grid::from_corners(&corners)
}

fn unit(rng: &mut StdRng) -> f64 {
    (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
}

/// Logs the counters of a finished query.
pub fn log_summary(label: &str, result: &OverlapMatrix) {
    let summary = result.summary();
    info!(
        "{}: shape {:?} (nd {:?}), {} overlaps, {} of {} blocks pruned ({:.0}%).",
        label,
        result.shape(),
        result.nd_shape(),
        summary.nnz,
        summary.pruned_blocks,
        summary.total_blocks(),
        summary.pruned_fraction() * 100.0
    );
}
