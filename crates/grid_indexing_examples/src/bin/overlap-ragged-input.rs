use grid_indexing::prelude::*;
use grid_indexing_examples::{init_tracing, log_summary};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Three triangles and a square in ragged form: coordinates, ring starts, geometry starts.
    let ragged = RaggedPolygons::try_new(
        vec![
            [0.0, 0.0], [2.0, 0.0], [0.0, 2.0],
            [2.0, 0.0], [2.0, 2.0], [0.0, 2.0],
            [2.0, 0.0], [4.0, 0.0], [2.0, 2.0],
            [2.0, 2.0], [4.0, 2.0], [4.0, 4.0], [2.0, 4.0],
        ],
        vec![0, 3, 6, 9, 13],
        vec![0, 1, 2, 3, 4],
    )?;
    let source = Grid::from_ragged(&ragged, &[2, 2])?;
    info!("decoded {} polygons", ragged.len());

    let target = grid_indexing_examples::rectilinear_grid(2, 2, (0.5, 0.5), (1.5, 1.5))?;
    let result = overlap(
        &source.chunked(&[1, 2])?,
        &target.chunked(&[2, 1])?,
        JoinConfig::default(),
    )?;
    log_summary("ragged input", &result);
    for (target_cell, source_cell) in result.iter() {
        info!(
            "target {:?} overlaps source {:?}",
            result.unravel_target(target_cell)?,
            result.unravel_source(source_cell)?
        );
    }
    Ok(())
}
