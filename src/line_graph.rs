use tracing::debug;

use crate::{
    errors::GraphIndexError,
    frame::FrameRef,
    graph::HeteroGraph,
    index::{EdgeList, GraphIndex, IndexMode},
    khop::ensure_homogeneous,
};

/// Line graph of a homogeneous graph: node `i` of the result is edge `i` of
/// `graph`, and `e1 -> e2` whenever `e1` ends where `e2` starts.
///
/// Without `backtracking`, `(u, v) -> (v, u)` pairs are left out. With
/// `shared`, the node table of the result aliases the edge table of `graph`.
pub fn line_graph(
    graph: &HeteroGraph,
    backtracking: bool,
    shared: bool,
) -> Result<HeteroGraph, GraphIndexError> {
    let source = graph.index();
    ensure_homogeneous(source, "line_graph")?;
    let edges = source.edges(0)?;
    let out = source.out_csr(0)?;
    let mut list = EdgeList::new(Vec::new(), Vec::new())?;
    for (e1, (u, v)) in edges.pairs().enumerate() {
        for (&w, &e2) in out.neighbors(v).iter().zip(out.row_edge_ids(v)) {
            if !backtracking && w == u {
                continue;
            }
            list.push(e1, e2);
        }
    }
    debug!(
        nodes = edges.len(),
        edges = list.len(),
        backtracking,
        "built line graph"
    );
    let index = GraphIndex::new(
        source.metagraph().clone(),
        vec![edges.len()],
        vec![list],
        IndexMode::ReadOnly,
    )?;
    let node_frame = if shared {
        graph.edge_frame(0)?.share()
    } else {
        FrameRef::empty(edges.len())
    };
    let edge_frame = FrameRef::empty(index.edge_lists()[0].len());
    HeteroGraph::with_frames(index, vec![node_frame], vec![edge_frame])
}
