use std::time::Instant;

use grid_indexing::prelude::*;
use grid_indexing_examples::{init_tracing, jittered_grid, log_summary};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let source = jittered_grid(120, 160, 0.6, 42)?;
    let target = jittered_grid(100, 100, 0.4, 7)?;

    let started = Instant::now();
    let index = DistributedIndex::new(source.clone().chunked(&[30, 40])?)?;
    let mut computed = 0;
    let mut sink = FnSink::new(|event| {
        if let JoinEvent::BlockComputed { .. } = event {
            computed += 1;
        }
    });
    let result = index.query_overlap_with_events(&target.clone().chunked(&[25, 25])?, &mut sink)?;
    info!(
        "chunked join took {:?} ({} blocks computed)",
        started.elapsed(),
        computed
    );
    log_summary("curvilinear jitter", &result);

    let started = Instant::now();
    let direct = direct_overlap(&RTreeEngine::default(), source.cells(), target.cells())?;
    info!("single-index join took {:?}", started.elapsed());
    anyhow::ensure!(
        result.matrix() == &direct,
        "chunked result differs from the single-index result"
    );
    Ok(())
}
