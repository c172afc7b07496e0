use ahash::AHashSet;
use tracing::debug;

use crate::{
    errors::GraphIndexError,
    frame::{EID, FeatureColumn, Frame, FrameRef, NID},
    graph::{HeteroGraph, NodeSelection},
    index::{EdgeId, EdgeList, GraphIndex, NodeId},
    remap::IdMapping,
};

/// Subgraph keeping every edge whose destination is selected. Node types and
/// counts are unchanged; kept edges stay in their original order and carry
/// their original id under [`EID`]. No other features are carried over.
pub fn in_subgraph(
    graph: &HeteroGraph,
    nodes: &NodeSelection,
) -> Result<HeteroGraph, GraphIndexError> {
    filter_edges(graph, nodes, Endpoint::Destination)
}

/// Subgraph keeping every edge whose source is selected. See [`in_subgraph`].
pub fn out_subgraph(
    graph: &HeteroGraph,
    nodes: &NodeSelection,
) -> Result<HeteroGraph, GraphIndexError> {
    filter_edges(graph, nodes, Endpoint::Source)
}

/// Subgraph induced by `nodes`: the selected nodes, renumbered in the order
/// given with repeats dropped, and every edge with both endpoints selected.
/// Original ids are stored under [`NID`] and [`EID`]; other features are
/// gathered from `graph`.
pub fn node_subgraph(
    graph: &HeteroGraph,
    nodes: &NodeSelection,
) -> Result<HeteroGraph, GraphIndexError> {
    let index = graph.index();
    let selected = nodes.resolve(index.metagraph(), index.node_counts())?;
    let mut mappings = Vec::with_capacity(selected.len());
    for ids in selected {
        let mut seen = AHashSet::with_capacity(ids.len());
        let induced: Vec<NodeId> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        mappings.push(IdMapping::from_induced(induced)?);
    }
    let mut kept = Vec::with_capacity(index.num_etypes());
    for (etype, list) in index.edge_lists().iter().enumerate() {
        let (src_type, dst_type) = index.metagraph().endpoint_types(etype)?;
        let eids: Vec<EdgeId> = list
            .pairs()
            .enumerate()
            .filter(|(_, (src, dst))| {
                mappings[src_type].to_new(*src).is_some()
                    && mappings[dst_type].to_new(*dst).is_some()
            })
            .map(|(eid, _)| eid)
            .collect();
        kept.push(eids);
    }
    let subgraph = induced_subgraph(graph, &mappings, &kept, true)?;
    debug!(
        nodes = subgraph.total_nodes(),
        edges = subgraph.total_edges(),
        "extracted node-induced subgraph"
    );
    Ok(subgraph)
}

/// Every kept edge must have both endpoints in `mappings`.
pub(crate) fn induced_subgraph(
    graph: &HeteroGraph,
    mappings: &[IdMapping],
    kept: &[Vec<EdgeId>],
    copy_features: bool,
) -> Result<HeteroGraph, GraphIndexError> {
    let index = graph.index();
    let mut edges = Vec::with_capacity(kept.len());
    for (etype, eids) in kept.iter().enumerate() {
        let (src_type, dst_type) = index.metagraph().endpoint_types(etype)?;
        let list = index.edges(etype)?;
        let mut out = EdgeList::with_capacity(eids.len());
        for &eid in eids {
            let (src, dst) = (list.src[eid], list.dst[eid]);
            let (Some(new_src), Some(new_dst)) = (
                mappings[src_type].to_new(src),
                mappings[dst_type].to_new(dst),
            ) else {
                return Err(GraphIndexError::out_of_range(format!(
                    "edge {eid} leaves the selected node set"
                )));
            };
            out.push(new_src, new_dst);
        }
        edges.push(out);
    }
    let counts = mappings.iter().map(IdMapping::len).collect();
    let sub_index = GraphIndex::new(index.metagraph().clone(), counts, edges, index.mode())?;

    let mut node_frames = Vec::with_capacity(mappings.len());
    for (ntype, mapping) in mappings.iter().enumerate() {
        let mut frame = if copy_features {
            graph.node_frame(ntype)?.read().gather(mapping.induced())?
        } else {
            Frame::new(mapping.len())
        };
        frame.insert(NID, FeatureColumn::Ids(mapping.induced().to_vec()))?;
        node_frames.push(FrameRef::new(frame));
    }
    let mut edge_frames = Vec::with_capacity(kept.len());
    for (etype, eids) in kept.iter().enumerate() {
        let mut frame = if copy_features {
            graph.edge_frame(etype)?.read().gather(eids)?
        } else {
            Frame::new(eids.len())
        };
        frame.insert(EID, FeatureColumn::Ids(eids.clone()))?;
        edge_frames.push(FrameRef::new(frame));
    }
    HeteroGraph::with_frames(sub_index, node_frames, edge_frames)
}

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Source,
    Destination,
}

fn filter_edges(
    graph: &HeteroGraph,
    nodes: &NodeSelection,
    endpoint: Endpoint,
) -> Result<HeteroGraph, GraphIndexError> {
    let index = graph.index();
    let selected = nodes.resolve(index.metagraph(), index.node_counts())?;
    let masks: Vec<Vec<bool>> = selected
        .iter()
        .zip(index.node_counts())
        .map(|(ids, &count)| {
            let mut mask = vec![false; count];
            for &id in ids {
                mask[id] = true;
            }
            mask
        })
        .collect();

    let mut edges = Vec::with_capacity(index.num_etypes());
    let mut edge_frames = Vec::with_capacity(index.num_etypes());
    for (etype, list) in index.edge_lists().iter().enumerate() {
        let (src_type, dst_type) = index.metagraph().endpoint_types(etype)?;
        let (ntype, column) = match endpoint {
            Endpoint::Source => (src_type, &list.src),
            Endpoint::Destination => (dst_type, &list.dst),
        };
        let eids: Vec<EdgeId> = column
            .iter()
            .enumerate()
            .filter(|(_, node)| masks[ntype][**node])
            .map(|(eid, _)| eid)
            .collect();
        let mut kept = EdgeList::with_capacity(eids.len());
        for &eid in &eids {
            kept.push(list.src[eid], list.dst[eid]);
        }
        let mut frame = Frame::new(eids.len());
        frame.insert(EID, FeatureColumn::Ids(eids))?;
        edges.push(kept);
        edge_frames.push(FrameRef::new(frame));
    }
    let sub_index = index.with_edges(edges, index.mode())?;
    debug!(
        edges = sub_index.total_edges(),
        of = index.total_edges(),
        direction = ?endpoint,
        "filtered edges by endpoint"
    );
    let node_frames = index
        .node_counts()
        .iter()
        .map(|&count| FrameRef::empty(count))
        .collect();
    HeteroGraph::with_frames(sub_index, node_frames, edge_frames)
}
