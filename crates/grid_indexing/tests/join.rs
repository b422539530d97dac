mod common;

use common::{block_has_entries, jittered, quad, rectilinear, reference};
use grid_indexing::prelude::*;

fn two_by_two() -> Grid {
    Grid::from_polygons(vec![
        quad([(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]),
        quad([(1.0, 0.0), (1.0, 1.0), (2.0, 1.0), (2.0, 0.0)]),
        quad([(0.0, 1.0), (0.0, 2.0), (1.0, 2.0), (1.0, 1.0)]),
        quad([(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (2.0, 1.0)]),
    ])
}

fn example_queries() -> Vec<(Grid, Vec<Vec<usize>>)> {
    vec![
        (
            Grid::from_polygons(vec![
                quad([(0.1, 0.0), (0.15, 0.45), (0.35, 0.4), (0.3, 0.05)]),
                quad([(0.4, 0.2), (0.4, 1.4), (1.7, 1.4), (1.7, 0.2)]),
            ]),
            vec![vec![0], vec![0, 1, 2, 3]],
        ),
        (
            Grid::from_polygons(vec![
                quad([(0.3, 0.1), (0.5, 0.45), (0.9, 0.4), (0.7, 0.05)]),
                quad([(0.7, 0.2), (1.2, 1.4), (1.7, 1.4), (1.7, 0.2)]),
            ]),
            vec![vec![0], vec![0, 1, 3]],
        ),
    ]
}

fn rows_of(result: &OverlapMatrix) -> Vec<Vec<usize>> {
    (0..result.shape().0)
        .map(|r| result.overlaps_of(r).collect())
        .collect()
}

#[test]
fn two_by_two_example_matches_single_index() {
    for (query, expected) in example_queries() {
        let direct = reference(&two_by_two(), &query, OverlapPredicate::Intersects);

        for source_chunk in [1, 2, 4] {
            let index = DistributedIndex::new(two_by_two().chunked(&[source_chunk]).unwrap()).unwrap();
            for query_chunk in [1, 2] {
                let result = index
                    .query_overlap(&query.clone().chunked(&[query_chunk]).unwrap())
                    .unwrap();
                assert_eq!(result.shape(), (2, 4));
                assert_eq!(result.matrix(), &direct);
                assert_eq!(rows_of(&result), expected);
            }
        }
    }
}

#[test]
fn distributed_join_equals_single_index_on_jittered_grids() {
    for seed in [7_u64, 42, 1234] {
        let source = jittered(9, 11, 0.6, seed);
        let target = rectilinear(7, 6, (-0.4, 0.3), 1.7, 1.3);
        let expected = reference(&source, &target, OverlapPredicate::Intersects);
        assert!(expected.nnz() > 0);

        let index = DistributedIndex::new(source.clone().chunked(&[4, 3]).unwrap()).unwrap();
        let result = index
            .query_overlap(&target.clone().chunked(&[3, 4]).unwrap())
            .unwrap();
        assert_eq!(result.matrix(), &expected, "seed {seed}");
    }
}

#[test]
fn result_does_not_depend_on_chunking() {
    let source = jittered(8, 8, 0.5, 99);
    let target = jittered(6, 10, 0.4, 100);
    let expected = reference(&source, &target, OverlapPredicate::Intersects);

    let layouts: [(&[usize], &[usize]); 5] = [
        (&[1, 1], &[6, 10]),
        (&[8, 8], &[1, 1]),
        (&[3, 5], &[4, 3]),
        (&[2, 8], &[6, 1]),
        (&[5, 5], &[5, 5]),
    ];
    for (source_chunks, target_chunks) in layouts {
        let index = DistributedIndex::new(source.clone().chunked(source_chunks).unwrap()).unwrap();
        let result = index
            .query_overlap(&target.clone().chunked(target_chunks).unwrap())
            .unwrap();
        assert_eq!(
            result.matrix(),
            &expected,
            "source chunks {source_chunks:?}, target chunks {target_chunks:?}"
        );
    }
}

#[test]
fn irregular_chunk_descriptions_give_the_same_result() {
    let source = jittered(6, 7, 0.5, 5);
    let target = rectilinear(5, 5, (0.2, 0.1), 1.3, 1.1);
    let expected = reference(&source, &target, OverlapPredicate::Intersects);

    let index = DistributedIndex::new(
        source
            .clone()
            .chunked_by(vec![vec![1, 4, 1], vec![3, 0, 4]])
            .unwrap(),
    )
    .unwrap();
    let result = index
        .query_overlap(&target.chunked_by(vec![vec![5], vec![2, 2, 1]]).unwrap())
        .unwrap();
    assert_eq!(result.matrix(), &expected);
}

#[test]
fn pruned_blocks_contain_no_overlaps() {
    let source = jittered(12, 12, 0.5, 11);
    let target = rectilinear(6, 6, (0.5, 0.5), 1.8, 1.8);
    let expected = reference(&source, &target, OverlapPredicate::Intersects);

    let source = source.chunked(&[3, 3]).unwrap();
    let target = target.chunked(&[2, 2]).unwrap();
    let index = DistributedIndex::new(source.clone()).unwrap();

    let mut sink = VecSink::new();
    let result = index.query_overlap_with_events(&target, &mut sink).unwrap();
    assert_eq!(result.matrix(), &expected);

    let summary = *result.summary();
    assert!(summary.pruned_blocks > 0);
    assert_eq!(
        summary.total_blocks(),
        source.chunk_count() * target.chunk_count()
    );

    for event in sink.as_slice() {
        if let JoinEvent::BlockPruned {
            target_chunk,
            source_chunk,
            ..
        } = event
        {
            let rows = target.partition().cell_indices(*target_chunk).unwrap();
            let mut cols = source.partition().cell_indices(*source_chunk).unwrap();
            cols.sort_unstable();
            assert!(
                !block_has_entries(&expected, &rows, &cols),
                "pruned block ({target_chunk}, {source_chunk}) has overlaps"
            );
        }
    }
}

#[test]
fn blocks_have_the_shape_of_their_chunks() {
    let source = rectilinear(5, 7, (0.0, 0.0), 1.0, 1.0).chunked(&[2, 3]).unwrap();
    let target = jittered(4, 4, 0.3, 3).chunked(&[3, 3]).unwrap();
    let index = DistributedIndex::new(source.clone()).unwrap();

    let mut sink = VecSink::new();
    index.query_overlap_with_events(&target, &mut sink).unwrap();

    let mut blocks = 0;
    for event in sink.as_slice() {
        let (t, s, shape) = match event {
            JoinEvent::BlockComputed {
                target_chunk,
                source_chunk,
                shape,
                ..
            }
            | JoinEvent::BlockPruned {
                target_chunk,
                source_chunk,
                shape,
            } => (*target_chunk, *source_chunk, *shape),
            _ => continue,
        };
        blocks += 1;
        assert_eq!(
            shape,
            (
                target.partition().chunk_cell_count(t).unwrap(),
                source.partition().chunk_cell_count(s).unwrap()
            )
        );
    }
    assert_eq!(blocks, source.chunk_count() * target.chunk_count());
}

#[test]
fn blocks_are_reported_in_chunk_order() {
    let source = rectilinear(4, 4, (0.0, 0.0), 1.0, 1.0).chunked(&[2, 2]).unwrap();
    let target = rectilinear(4, 4, (0.5, 0.5), 1.0, 1.0).chunked(&[2, 2]).unwrap();
    let mut sink = VecSink::new();
    DistributedIndex::new(source)
        .unwrap()
        .query_overlap_with_events(&target, &mut sink)
        .unwrap();

    let order: Vec<(usize, usize)> = sink
        .as_slice()
        .iter()
        .filter_map(|event| match event {
            JoinEvent::BlockComputed {
                target_chunk,
                source_chunk,
                ..
            }
            | JoinEvent::BlockPruned {
                target_chunk,
                source_chunk,
                ..
            } => Some((*target_chunk, *source_chunk)),
            _ => None,
        })
        .collect();
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(order, sorted);
    assert_eq!(order.len(), 16);
}

#[test]
fn single_chunk_grids_need_one_fine_query() {
    let source = jittered(5, 5, 0.4, 21);
    let target = jittered(4, 6, 0.4, 22);
    let expected = reference(&source, &target, OverlapPredicate::Intersects);

    let index = DistributedIndex::new(source.chunked(&[5, 5]).unwrap()).unwrap();
    let result = index.query_overlap(&target.chunked(&[4, 6]).unwrap()).unwrap();
    assert_eq!(result.matrix(), &expected);
    assert_eq!(result.summary().computed_blocks, 1);
    assert_eq!(result.summary().pruned_blocks, 0);
}

#[test]
fn disjoint_grids_are_fully_pruned() {
    let source = rectilinear(3, 3, (0.0, 0.0), 1.0, 1.0).chunked(&[1, 1]).unwrap();
    let target = rectilinear(3, 3, (10.0, 10.0), 1.0, 1.0).chunked(&[2, 2]).unwrap();
    let index = DistributedIndex::new(source).unwrap();

    let result = index.query_overlap(&target).unwrap();
    assert_eq!(result.shape(), (9, 9));
    assert_eq!(result.nnz(), 0);
    assert_eq!(result.summary().computed_blocks, 0);
    assert_eq!(index.fine_indices().built_count(), 0);
}

#[test]
fn boundary_strategy_and_threads_do_not_change_the_result() {
    let source = jittered(10, 10, 0.6, 77);
    let target = jittered(7, 9, 0.6, 78);
    let expected = reference(&source, &target, OverlapPredicate::Intersects);
    let source = source.chunked(&[3, 4]).unwrap();
    let target = target.chunked(&[2, 5]).unwrap();

    let configs = [
        JoinConfig::new().with_boundary(BoundaryStrategy::Envelope),
        JoinConfig::new().with_threads(1),
        JoinConfig::new().with_threads(3),
        JoinConfig::new()
            .with_boundary(BoundaryStrategy::Envelope)
            .with_threads(2),
    ];
    for config in configs {
        let result = overlap(&source, &target, config.clone()).unwrap();
        assert_eq!(result.matrix(), &expected, "{config:?}");
    }
}

#[test]
fn interior_predicate_drops_touching_cells() {
    let source = rectilinear(4, 4, (0.0, 0.0), 1.0, 1.0);
    let target = rectilinear(2, 2, (0.0, 0.0), 2.0, 2.0);
    let expected = reference(&source, &target, OverlapPredicate::InteriorsIntersect);

    let config = JoinConfig::new().with_predicate(OverlapPredicate::InteriorsIntersect);
    let result = overlap(
        &source.chunked(&[2, 1]).unwrap(),
        &target.chunked(&[1, 2]).unwrap(),
        config,
    )
    .unwrap();
    assert_eq!(result.matrix(), &expected);
    // Each 2x2 target cell covers exactly four source cells.
    for row in 0..4 {
        assert_eq!(result.overlaps_of(row).count(), 4);
    }
}

#[test]
fn nd_coordinates_follow_the_grid_shapes() {
    let source = rectilinear(2, 3, (0.0, 0.0), 1.0, 1.0).chunked(&[1, 2]).unwrap();
    let target = Grid::from_polygons(vec![quad([
        (2.2, 1.2),
        (2.2, 1.8),
        (2.8, 1.8),
        (2.8, 1.2),
    ])])
    .chunked(&[1])
    .unwrap();

    let result = DistributedIndex::new(source)
        .unwrap()
        .query_overlap(&target)
        .unwrap();
    assert_eq!(result.nd_shape(), vec![1, 2, 3]);

    let hits: Vec<(usize, usize)> = result.iter().collect();
    assert_eq!(hits, vec![(0, 5)]);
    assert_eq!(result.unravel_source(5).unwrap(), vec![1, 2]);
    assert!(result.get_nd(&[0], &[1, 2]).unwrap());
}

#[test]
fn ragged_input_round_trips_into_the_join() {
    let cells = two_by_two().cells().to_vec();
    let ragged = RaggedPolygons::from_polygons(&cells).unwrap();
    let source = Grid::from_ragged(&ragged, &[2, 2]).unwrap();

    let (query, _) = example_queries().remove(0);
    let expected = reference(&source, &query, OverlapPredicate::Intersects);
    let result = overlap(
        &source.chunked(&[1, 1]).unwrap(),
        &query.chunked(&[1]).unwrap(),
        JoinConfig::default(),
    )
    .unwrap();
    assert_eq!(result.matrix(), &expected);
    assert_eq!(result.nd_shape(), vec![2, 2, 2]);
}

#[test]
fn unsupported_target_geometry_fails_the_query() {
    let index = DistributedIndex::new(two_by_two().chunked(&[2]).unwrap()).unwrap();
    let outer = geo::LineString::from(vec![(10.0, 10.0), (14.0, 10.0), (14.0, 14.0), (10.0, 14.0)]);
    let hole = geo::LineString::from(vec![(11.0, 11.0), (12.0, 11.0), (12.0, 12.0)]);
    let target = Grid::from_polygons(vec![geo::Polygon::new(outer, vec![hole])])
        .chunked(&[1])
        .unwrap();

    // The cell is far from every source chunk and still rejected.
    let err = index.query_overlap(&target).unwrap_err();
    assert!(matches!(err.root(), Error::UnsupportedGeometry(_)));
}

#[test]
fn non_finite_and_self_intersecting_cells_are_errors() {
    let source = two_by_two().chunked(&[2]).unwrap();
    let nan_cell = quad([(f64::NAN, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
    let bowtie = quad([(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)]);

    for cell in [nan_cell, bowtie] {
        let target = Grid::from_polygons(vec![cell]).chunked(&[1]).unwrap();
        let err = overlap(&source, &target, JoinConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Chunk { chunk: 0, .. }));
        assert!(matches!(err.root(), Error::UnsupportedGeometry(_)));
    }
}
