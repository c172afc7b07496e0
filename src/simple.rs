use tracing::debug;

use crate::{
    errors::GraphIndexError,
    frame::FeatureColumn,
    graph::HeteroGraph,
    index::{EdgeId, EdgeList, GraphIndex, IndexMode},
    khop::ensure_homogeneous,
};

/// Result of coalescing parallel edges.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleIndex {
    pub index: GraphIndex,
    /// Per edge type: how many original edges each new edge stands for.
    pub counts: Vec<Vec<u64>>,
    /// Per edge type: the new edge id of every original edge.
    pub edge_maps: Vec<Vec<EdgeId>>,
}

/// Coalesces edges sharing `(src, dst)` within each edge type. New edges are
/// ordered by `(src, dst)`.
pub fn to_simple_index(index: &GraphIndex, mode: IndexMode) -> Result<SimpleIndex, GraphIndexError> {
    let mut edges = Vec::with_capacity(index.num_etypes());
    let mut counts = Vec::with_capacity(index.num_etypes());
    let mut edge_maps = Vec::with_capacity(index.num_etypes());
    for list in index.edge_lists() {
        let mut order: Vec<EdgeId> = (0..list.len()).collect();
        order.sort_by_key(|&eid| (list.src[eid], list.dst[eid]));
        let mut simple = EdgeList::with_capacity(list.len());
        let mut count: Vec<u64> = Vec::new();
        let mut edge_map = vec![0; list.len()];
        let mut previous = None;
        for eid in order {
            let pair = (list.src[eid], list.dst[eid]);
            if previous != Some(pair) {
                simple.push(pair.0, pair.1);
                count.push(0);
                previous = Some(pair);
            }
            let new_id = simple.len() - 1;
            count[new_id] += 1;
            edge_map[eid] = new_id;
        }
        edges.push(simple);
        counts.push(count);
        edge_maps.push(edge_map);
    }
    let simple_index = index.with_edges(edges, mode)?;
    debug!(
        before = index.total_edges(),
        after = simple_index.total_edges(),
        "coalesced parallel edges"
    );
    Ok(SimpleIndex {
        index: simple_index,
        counts,
        edge_maps,
    })
}

/// Simple version of `graph` without features.
///
/// With `return_counts`, the multiplicity of every new edge is stored under
/// that key on the result. With `writeback_mapping`, the new edge id of every
/// original edge is written under that key onto `graph`'s own edge tables.
pub fn to_simple(
    graph: &HeteroGraph,
    return_counts: Option<&str>,
    writeback_mapping: Option<&str>,
) -> Result<HeteroGraph, GraphIndexError> {
    let SimpleIndex {
        index,
        counts,
        edge_maps,
    } = to_simple_index(graph.index(), IndexMode::ReadOnly)?;
    let simple = HeteroGraph::from_index(index);
    if let Some(key) = return_counts {
        for (etype, count) in counts.into_iter().enumerate() {
            simple
                .edge_frame(etype)?
                .write()
                .insert(key, FeatureColumn::Counts(count))?;
        }
    }
    if let Some(key) = writeback_mapping {
        for (etype, edge_map) in edge_maps.into_iter().enumerate() {
            graph
                .edge_frame(etype)?
                .write()
                .insert(key, FeatureColumn::Ids(edge_map))?;
        }
    }
    Ok(simple)
}

/// Readonly simple graph of a homogeneous graph, with no features.
pub fn to_simple_graph(graph: &HeteroGraph) -> Result<HeteroGraph, GraphIndexError> {
    ensure_homogeneous(graph.index(), "to_simple_graph")?;
    let simple = to_simple_index(graph.index(), IndexMode::ReadOnly)?;
    Ok(HeteroGraph::from_index(simple.index))
}
