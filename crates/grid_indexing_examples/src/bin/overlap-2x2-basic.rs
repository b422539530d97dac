use grid_indexing::prelude::*;
use grid_indexing_examples::{init_tracing, log_summary, quad};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let source = Grid::from_polygons(vec![
        quad([(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]),
        quad([(1.0, 0.0), (1.0, 1.0), (2.0, 1.0), (2.0, 0.0)]),
        quad([(0.0, 1.0), (0.0, 2.0), (1.0, 2.0), (1.0, 1.0)]),
        quad([(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (2.0, 1.0)]),
    ]);
    let query = Grid::from_polygons(vec![
        quad([(0.3, 0.1), (0.5, 0.45), (0.9, 0.4), (0.7, 0.05)]),
        quad([(0.7, 0.2), (1.2, 1.4), (1.7, 1.4), (1.7, 0.2)]),
    ]);

    let index = DistributedIndex::new(source.clone().chunked(&[1])?)?;
    let result = index.query_overlap(&query.clone().chunked(&[1])?)?;
    log_summary("2x2 example", &result);

    for (row, cells) in result.to_dense().iter().enumerate() {
        let marks: String = cells.iter().map(|&hit| if hit { 'x' } else { '.' }).collect();
        info!("query {}: {}", row, marks);
    }

    let direct = direct_overlap(&RTreeEngine::default(), source.cells(), query.cells())?;
    anyhow::ensure!(
        result.matrix() == &direct,
        "chunked result differs from the single-index result"
    );
    Ok(())
}
