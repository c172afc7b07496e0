use crate::{
    errors::GraphIndexError,
    frame::{FrameRef, FrameSharing},
    graph::HeteroGraph,
    index::{EdgeList, GraphIndex},
};

/// Flips every edge while keeping its id: edge `i = (u, v)` becomes edge
/// `i = (v, u)`. Each canonical type `(s, r, d)` becomes `(d, r, s)`. The
/// index mode is carried over.
pub fn reverse_index(index: &GraphIndex) -> Result<GraphIndex, GraphIndexError> {
    let edges = index
        .edge_lists()
        .iter()
        .map(|list| EdgeList {
            src: list.dst.clone(),
            dst: list.src.clone(),
        })
        .collect();
    GraphIndex::new(
        index.metagraph().reversed(),
        index.node_counts().to_vec(),
        edges,
        index.mode(),
    )
}

/// Reverse of `graph`. Feature tables selected in `sharing` are aliased, not
/// copied: writes through either graph are visible in both. While aliased,
/// neither graph accepts topology edits until [`HeteroGraph::detach_frames`]
/// is called.
pub fn reverse(graph: &HeteroGraph, sharing: FrameSharing) -> Result<HeteroGraph, GraphIndexError> {
    let index = reverse_index(graph.index())?;
    let mut node_frames = Vec::with_capacity(index.num_ntypes());
    for (ntype, &count) in index.node_counts().iter().enumerate() {
        node_frames.push(if sharing.ndata {
            graph.node_frame(ntype)?.share()
        } else {
            FrameRef::empty(count)
        });
    }
    let mut edge_frames = Vec::with_capacity(index.num_etypes());
    for (etype, list) in index.edge_lists().iter().enumerate() {
        edge_frames.push(if sharing.edata {
            graph.edge_frame(etype)?.share()
        } else {
            FrameRef::empty(list.len())
        });
    }
    HeteroGraph::with_frames(index, node_frames, edge_frames)
}
