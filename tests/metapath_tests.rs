use heterograph::{
    CanonicalEdgeType, EdgeList, EdgeTypeKey, FeatureColumn, GraphIndex, GraphIndexError, HeteroGraph,
    IndexMode, Metagraph, metapath_reachable_graph,
};

fn user_game() -> HeteroGraph {
    let metagraph = Metagraph::new(
        vec!["user".into(), "game".into()],
        vec![
            CanonicalEdgeType::new("user", "plays", "game"),
            CanonicalEdgeType::new("game", "played-by", "user"),
        ],
    )
    .unwrap();
    let index = GraphIndex::new(
        metagraph,
        vec![3, 2],
        vec![
            EdgeList::from_pairs(&[(0, 0), (1, 0), (2, 1)]),
            EdgeList::from_pairs(&[(0, 0), (0, 1), (1, 2)]),
        ],
        IndexMode::ReadOnly,
    )
    .unwrap();
    HeteroGraph::from_index(index)
}

#[test]
fn round_trip_path_is_homogeneous() {
    let g = user_game();
    g.set_node_feature("user", "age", FeatureColumn::Counts(vec![20, 30, 40]))
        .unwrap();
    let mg = metapath_reachable_graph(&g, &["plays", "played-by"]).unwrap();
    assert!(mg.is_homogeneous());
    assert_eq!(mg.ntypes(), &["user".to_string()]);
    assert_eq!(
        mg.edge_pairs().unwrap(),
        vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 2)]
    );
    assert_eq!(
        mg.ndata("age").unwrap(),
        Some(FeatureColumn::Counts(vec![20, 30, 40]))
    );
    assert!(mg.is_readonly());
}

#[test]
fn single_step_path_is_bipartite() {
    let g = user_game();
    let mg = metapath_reachable_graph(&g, &["plays"]).unwrap();
    assert_eq!(mg.ntypes(), &["user".to_string(), "game".to_string()]);
    assert_eq!(mg.num_nodes("game").unwrap(), 2);
    assert_eq!(mg.edge_pairs().unwrap(), vec![(0, 0), (1, 0), (2, 1)]);
}

#[test]
fn duplicate_paths_collapse_to_one_edge() {
    let metagraph = Metagraph::new(
        vec!["a".into(), "b".into()],
        vec![
            CanonicalEdgeType::new("a", "ab", "b"),
            CanonicalEdgeType::new("b", "ba", "a"),
        ],
    )
    .unwrap();
    let index = GraphIndex::new(
        metagraph,
        vec![1, 2],
        vec![
            EdgeList::from_pairs(&[(0, 0), (0, 1), (0, 1)]),
            EdgeList::from_pairs(&[(0, 0), (1, 0)]),
        ],
        IndexMode::ReadOnly,
    )
    .unwrap();
    let mg = metapath_reachable_graph(&HeteroGraph::from_index(index), &["ab", "ba"]).unwrap();
    assert_eq!(mg.edge_pairs().unwrap(), vec![(0, 0)]);
}

#[test]
fn broken_paths_are_rejected() {
    let g = user_game();
    assert!(matches!(
        metapath_reachable_graph(&g, &["plays", "plays"]),
        Err(GraphIndexError::InvalidArgument(_))
    ));
    assert!(metapath_reachable_graph::<&str>(&g, &[]).is_err());
    assert!(metapath_reachable_graph(&g, &["owns"]).is_err());
}

fn linked() -> HeteroGraph {
    let metagraph = Metagraph::new(
        vec!["a".into(), "b".into()],
        vec![
            CanonicalEdgeType::new("a", "link", "b"),
            CanonicalEdgeType::new("b", "link", "a"),
        ],
    )
    .unwrap();
    let index = GraphIndex::new(
        metagraph,
        vec![2, 2],
        vec![
            EdgeList::from_pairs(&[(0, 1), (1, 0)]),
            EdgeList::from_pairs(&[(1, 1), (0, 0)]),
        ],
        IndexMode::ReadOnly,
    )
    .unwrap();
    HeteroGraph::from_index(index)
}

#[test]
fn shared_relation_names_need_canonical_steps() {
    let g = linked();
    assert!(matches!(
        metapath_reachable_graph(&g, &["link", "link"]),
        Err(GraphIndexError::InvalidArgument(_))
    ));
    let forward = CanonicalEdgeType::new("a", "link", "b");
    let backward = CanonicalEdgeType::new("b", "link", "a");
    let mg = metapath_reachable_graph(&g, &[&forward, &backward]).unwrap();
    assert_eq!(mg.ntypes(), &["a".to_string()]);
    assert_eq!(mg.edge_pairs().unwrap(), vec![(0, 1), (1, 0)]);

    let mg = metapath_reachable_graph(&g, &[&backward]).unwrap();
    assert_eq!(mg.ntypes(), &["b".to_string(), "a".to_string()]);
    assert_eq!(mg.edge_pairs().unwrap(), vec![(0, 0), (1, 1)]);
}

#[test]
fn relation_and_canonical_steps_mix() {
    let g = user_game();
    let played_by = CanonicalEdgeType::new("game", "played-by", "user");
    let steps = [EdgeTypeKey::from("plays"), EdgeTypeKey::from(&played_by)];
    let mg = metapath_reachable_graph(&g, &steps).unwrap();
    assert_eq!(
        mg.edge_pairs().unwrap(),
        vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 2)]
    );
}
