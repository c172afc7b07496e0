use heterograph::{FeatureColumn, GraphIndexError, HeteroGraph, line_graph};

fn three_edges() -> HeteroGraph {
    HeteroGraph::homogeneous(3, &[(0, 1), (1, 0), (1, 2)]).unwrap()
}

#[test]
fn backtracking_line_graph() {
    let lg = line_graph(&three_edges(), true, false).unwrap();
    assert_eq!(lg.num_nodes("_N").unwrap(), 3);
    assert_eq!(lg.edge_pairs().unwrap(), vec![(0, 1), (0, 2), (1, 0)]);
    assert!(lg.is_readonly());
}

#[test]
fn non_backtracking_drops_reversals() {
    let lg = line_graph(&three_edges(), false, false).unwrap();
    assert_eq!(lg.edge_pairs().unwrap(), vec![(0, 2)]);
}

#[test]
fn shared_line_graph_aliases_edge_features() {
    let g = three_edges();
    g.set_edge_feature("_E", "w", FeatureColumn::Values(vec![1.0, 2.0, 3.0]))
        .unwrap();
    let lg = line_graph(&g, true, true).unwrap();
    assert!(lg.node_frame(0).unwrap().ptr_eq(g.edge_frame(0).unwrap()));
    assert_eq!(lg.ndata("w").unwrap(), g.edata("w").unwrap());

    let unshared = line_graph(&g, true, false).unwrap();
    assert_eq!(unshared.ndata("w").unwrap(), None);
}

#[test]
fn heterogeneous_input_is_rejected() {
    let g = HeteroGraph::bipartite("user", "plays", "game", (2, 2), &[(0, 1)]).unwrap();
    assert!(matches!(
        line_graph(&g, true, false),
        Err(GraphIndexError::InvalidArgument(_))
    ));
}
