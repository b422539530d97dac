use grid_indexing::prelude::*;
use grid_indexing_examples::{init_tracing, log_summary, rectilinear_grid};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // A 1 degree grid regridded onto a coarser, shifted 2.5 degree grid.
    let source = rectilinear_grid(180, 360, (-180.0, -90.0), (1.0, 1.0))?;
    let target = rectilinear_grid(72, 144, (-178.75, -88.75), (2.5, 2.5))?;

    let index = DistributedIndex::with_config(
        source.chunked(&[45, 90])?,
        JoinConfig::new().with_predicate(OverlapPredicate::InteriorsIntersect),
    )?;
    let result = index.query_overlap(&target.chunked(&[24, 48])?)?;
    log_summary("rectilinear regrid", &result);

    let first: Vec<usize> = result.overlaps_of(0).collect();
    let coords = first
        .iter()
        .map(|&c| result.unravel_source(c))
        .collect::<Result<Vec<_>>>()?;
    info!("target cell 0 overlaps source cells {:?}", coords);
    info!(
        "fine indices built: {} of {}",
        index.fine_indices().built_count(),
        index.fine_indices().len()
    );
    Ok(())
}
