use heterograph::{
    CanonicalEdgeType, EdgeList, GraphIndex, IndexMode, Metagraph,
    safety::{count_isolated_nodes, count_parallel_edges, count_self_loops, inspect_index, run_strict_checks},
};

#[test]
fn report_counts_every_issue() {
    let index = GraphIndex::from_pairs(
        6,
        &[(0, 1), (0, 1), (0, 1), (2, 2), (3, 1)],
        IndexMode::ReadOnly,
    )
    .unwrap();
    assert_eq!(count_parallel_edges(&index).unwrap().parallel_edges, 2);
    assert_eq!(count_self_loops(&index).unwrap().self_loops, 1);
    assert_eq!(count_isolated_nodes(&index).unwrap().isolated_nodes, 2);

    let report = inspect_index(&index).unwrap();
    assert_eq!(report.total_nodes, 6);
    assert_eq!(report.total_edges, 5);
    assert!(report.has_issues());
    let err = run_strict_checks(&index).unwrap_err();
    assert_eq!(err.report, report);
    assert!(err.to_string().contains("2 parallel edges"));
}

#[test]
fn isolated_nodes_alone_pass_strict_checks() {
    let index = GraphIndex::from_pairs(5, &[(0, 1), (1, 2)], IndexMode::ReadOnly).unwrap();
    let report = run_strict_checks(&index).unwrap();
    assert_eq!(report.isolated_nodes, 2);
}

#[test]
fn self_loops_only_count_on_square_types() {
    let metagraph = Metagraph::new(
        vec!["user".into(), "game".into()],
        vec![
            CanonicalEdgeType::new("user", "plays", "game"),
            CanonicalEdgeType::new("user", "follows", "user"),
        ],
    )
    .unwrap();
    let index = GraphIndex::new(
        metagraph,
        vec![2, 2],
        vec![
            EdgeList::from_pairs(&[(0, 0), (1, 1)]),
            EdgeList::from_pairs(&[(1, 1)]),
        ],
        IndexMode::ReadOnly,
    )
    .unwrap();
    assert_eq!(inspect_index(&index).unwrap().self_loops, 1);
}
