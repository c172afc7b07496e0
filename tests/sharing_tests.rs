use heterograph::{
    FeatureColumn, FrameSharing, GraphIndex, GraphIndexError, HeteroGraph, IndexMode, reverse,
};

fn mutable_path() -> HeteroGraph {
    let index = GraphIndex::from_pairs(3, &[(0, 1), (1, 2)], IndexMode::Mutable).unwrap();
    let g = HeteroGraph::from_index(index);
    g.set_node_feature("_N", "h", FeatureColumn::Values(vec![0.5, 1.5, 2.5]))
        .unwrap();
    g
}

#[test]
fn shared_tables_block_topology_edits() {
    let mut g = mutable_path();
    let mut rg = reverse(&g, FrameSharing::all()).unwrap();
    assert!(g.has_shared_frames());
    assert!(rg.has_shared_frames());
    assert!(matches!(
        g.add_edges("_E", &[2], &[0]),
        Err(GraphIndexError::SchemaMismatch(_))
    ));
    assert!(matches!(
        rg.add_nodes("_N", 1),
        Err(GraphIndexError::SchemaMismatch(_))
    ));

    g.detach_frames();
    assert!(!g.has_shared_frames());
    assert_eq!(g.add_edges("_E", &[2], &[0]).unwrap(), 2..3);
    assert_eq!(g.num_edges("_E").unwrap(), 3);

    // the reverse still holds the only handle to the old table
    assert!(!rg.has_shared_frames());
    assert_eq!(rg.add_nodes("_N", 1).unwrap(), 3..4);
    assert_eq!(
        rg.ndata("h").unwrap(),
        Some(FeatureColumn::Values(vec![0.5, 1.5, 2.5, 0.0]))
    );
}

#[test]
fn detached_tables_stop_seeing_writes() {
    let mut g = mutable_path();
    let rg = reverse(&g, FrameSharing { ndata: true, edata: false }).unwrap();
    g.detach_frames();
    g.set_node_feature("_N", "h", FeatureColumn::Values(vec![9.0; 3]))
        .unwrap();
    assert_eq!(
        rg.ndata("h").unwrap(),
        Some(FeatureColumn::Values(vec![0.5, 1.5, 2.5]))
    );
}

#[test]
fn clone_detaches_feature_tables() {
    let g = mutable_path();
    let mut copy = g.clone();
    assert!(!g.has_shared_frames());
    assert!(!copy.has_shared_frames());
    copy.add_nodes("_N", 2).unwrap();
    assert_eq!(copy.num_nodes("_N").unwrap(), 5);
    assert_eq!(g.num_nodes("_N").unwrap(), 3);
    assert_eq!(
        g.ndata("h").unwrap(),
        Some(FeatureColumn::Values(vec![0.5, 1.5, 2.5]))
    );
}

#[test]
fn readonly_graph_refuses_edits_before_sharing_check() {
    let mut g = HeteroGraph::homogeneous(2, &[(0, 1)]).unwrap();
    assert!(matches!(
        g.add_edges("_E", &[1], &[0]),
        Err(GraphIndexError::InvalidArgument(_))
    ));
}

#[test]
fn shared_tables_are_readable_across_threads() {
    let g = mutable_path();
    let rg = reverse(&g, FrameSharing::all()).unwrap();
    std::thread::scope(|scope| {
        scope.spawn(|| {
            g.set_node_feature("_N", "deg", FeatureColumn::Counts(vec![1, 1, 0]))
                .unwrap();
        });
        scope.spawn(|| {
            let h = rg.ndata("h").unwrap();
            assert_eq!(h, Some(FeatureColumn::Values(vec![0.5, 1.5, 2.5])));
        });
    });
    assert_eq!(
        rg.ndata("deg").unwrap(),
        Some(FeatureColumn::Counts(vec![1, 1, 0]))
    );
}
