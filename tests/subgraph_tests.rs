use heterograph::{
    CanonicalEdgeType, EID, EdgeList, FeatureColumn, GraphIndex, GraphIndexError, HeteroGraph,
    IndexMode, Metagraph, NID, NodeSelection, in_subgraph, node_subgraph, out_subgraph,
};

fn square_with_back_edge() -> HeteroGraph {
    HeteroGraph::homogeneous(4, &[(0, 1), (1, 2), (2, 3), (3, 0), (1, 0)]).unwrap()
}

fn social() -> HeteroGraph {
    let metagraph = Metagraph::new(
        vec!["user".into(), "game".into()],
        vec![
            CanonicalEdgeType::new("user", "follows", "user"),
            CanonicalEdgeType::new("user", "plays", "game"),
        ],
    )
    .unwrap();
    let index = GraphIndex::new(
        metagraph,
        vec![3, 2],
        vec![
            EdgeList::from_pairs(&[(0, 1), (1, 2), (2, 0)]),
            EdgeList::from_pairs(&[(0, 0), (1, 1), (2, 1)]),
        ],
        IndexMode::ReadOnly,
    )
    .unwrap();
    HeteroGraph::from_index(index)
}

fn ids(column: Option<FeatureColumn>) -> Vec<usize> {
    match column {
        Some(FeatureColumn::Ids(ids)) => ids,
        other => panic!("expected id column, got {other:?}"),
    }
}

#[test]
fn in_subgraph_keeps_edges_into_selection() {
    let g = square_with_back_edge();
    let sg = in_subgraph(&g, &NodeSelection::from(vec![0])).unwrap();
    assert_eq!(sg.num_nodes("_N").unwrap(), 4);
    assert_eq!(sg.edge_pairs().unwrap(), vec![(3, 0), (1, 0)]);
    assert_eq!(ids(sg.edata(EID).unwrap()), vec![3, 4]);
}

#[test]
fn out_subgraph_keeps_edges_from_selection() {
    let g = square_with_back_edge();
    let sg = out_subgraph(&g, &NodeSelection::from(vec![1, 3])).unwrap();
    assert_eq!(sg.edge_pairs().unwrap(), vec![(1, 2), (3, 0), (1, 0)]);
    assert_eq!(ids(sg.edata(EID).unwrap()), vec![1, 3, 4]);
}

#[test]
fn edge_filtered_subgraphs_drop_features() {
    let g = square_with_back_edge();
    g.set_node_feature("_N", "h", FeatureColumn::Values(vec![0.0, 1.0, 2.0, 3.0]))
        .unwrap();
    g.set_edge_feature("_E", "w", FeatureColumn::Values(vec![3.0, 4.0, 5.0, 6.0, 7.0]))
        .unwrap();
    for sg in [
        in_subgraph(&g, &NodeSelection::from(vec![1])).unwrap(),
        out_subgraph(&g, &NodeSelection::from(vec![1])).unwrap(),
    ] {
        assert_eq!(sg.ndata("h").unwrap(), None);
        assert_eq!(sg.edata("w").unwrap(), None);
        assert!(sg.edata(EID).unwrap().is_some());
        assert!(!sg.has_shared_frames());
    }
    assert!(g.ndata("h").unwrap().is_some());
}

#[test]
fn typed_selection_filters_each_edge_type() {
    let g = social();
    let selection = NodeSelection::typed([("user", vec![0]), ("game", vec![1])]);
    let sg = in_subgraph(&g, &selection).unwrap();
    assert_eq!(sg.edges("follows").unwrap().to_pairs(), vec![(2, 0)]);
    assert_eq!(sg.edges("plays").unwrap().to_pairs(), vec![(1, 1), (2, 1)]);
    assert_eq!(ids(sg.edge_feature("plays", EID).unwrap()), vec![1, 2]);

    let sg = out_subgraph(&g, &NodeSelection::typed([("user", vec![2])])).unwrap();
    assert_eq!(sg.edges("follows").unwrap().to_pairs(), vec![(2, 0)]);
    assert_eq!(sg.edges("plays").unwrap().to_pairs(), vec![(2, 1)]);
}

#[test]
fn missing_node_type_selects_nothing() {
    let g = social();
    let sg = in_subgraph(&g, &NodeSelection::typed([("game", vec![0, 1])])).unwrap();
    assert_eq!(sg.num_edges("follows").unwrap(), 0);
    assert_eq!(sg.num_edges("plays").unwrap(), 3);
}

#[test]
fn selections_are_validated() {
    let g = social();
    assert!(matches!(
        in_subgraph(&g, &NodeSelection::from(vec![0])),
        Err(GraphIndexError::InvalidArgument(_))
    ));
    assert!(in_subgraph(&g, &NodeSelection::typed([("item", vec![0])])).is_err());
    assert!(matches!(
        out_subgraph(&g, &NodeSelection::typed([("game", vec![2])])),
        Err(GraphIndexError::OutOfRange(_))
    ));
}

#[test]
fn node_subgraph_renumbers_in_request_order() {
    let g = square_with_back_edge();
    let sg = node_subgraph(&g, &NodeSelection::from(vec![3, 0, 0, 1])).unwrap();
    assert_eq!(ids(sg.ndata(NID).unwrap()), vec![3, 0, 1]);
    assert_eq!(ids(sg.edata(EID).unwrap()), vec![0, 3, 4]);
    assert_eq!(sg.edge_pairs().unwrap(), vec![(1, 2), (0, 1), (2, 1)]);
    assert_eq!(sg.is_readonly(), g.is_readonly());
}

#[test]
fn node_subgraph_gathers_features() {
    let g = social();
    g.set_node_feature("user", "age", FeatureColumn::Counts(vec![30, 40, 50]))
        .unwrap();
    let selection = NodeSelection::typed([("user", vec![2, 0]), ("game", vec![1])]);
    let sg = node_subgraph(&g, &selection).unwrap();
    assert_eq!(
        sg.node_feature("user", "age").unwrap(),
        Some(FeatureColumn::Counts(vec![50, 30]))
    );
    assert_eq!(sg.edges("follows").unwrap().to_pairs(), vec![(0, 1)]);
    assert_eq!(sg.edges("plays").unwrap().to_pairs(), vec![(0, 0)]);
    assert_eq!(ids(sg.edge_feature("plays", EID).unwrap()), vec![2]);
}
