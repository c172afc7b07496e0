use tracing::debug;

use crate::{
    cache::Direction,
    errors::GraphIndexError,
    frame::FrameRef,
    graph::HeteroGraph,
    index::{GraphIndex, IndexMode, NodeId},
    schema::{DEFAULT_ETYPE, EdgeTypeKey},
};

/// Graph connecting `u` to `v` whenever some path from `u` follows the
/// relations of `metapath` in order and ends at `v`. One edge per reachable
/// pair, ordered by `(src, dst)`. Steps are relation names or canonical edge
/// types ([`EdgeTypeKey`]); a relation name shared by several edge types must
/// be given in canonical form.
///
/// When the path starts and ends on the same node type the result is
/// homogeneous over that type; otherwise it is bipartite from the start type
/// to the end type. Both full node sets are kept and their features copied.
pub fn metapath_reachable_graph<'a, S>(
    graph: &HeteroGraph,
    metapath: &[S],
) -> Result<HeteroGraph, GraphIndexError>
where
    S: Into<EdgeTypeKey<'a>> + Copy,
{
    let index = graph.index();
    let steps = index.metagraph().resolve_metapath(metapath)?;
    let mut reach = index
        .adjacency_matrix(steps[0], Direction::Outgoing)?
        .to_boolean();
    for &etype in &steps[1..] {
        let step = index.adjacency_matrix(etype, Direction::Outgoing)?;
        reach = reach.matmul(&step)?.to_boolean();
    }

    let (src_type, _) = index.metagraph().endpoint_types(steps[0])?;
    let (_, dst_type) = index.metagraph().endpoint_types(steps[steps.len() - 1])?;
    let src_name = index.metagraph().ntype_name(src_type)?;
    let dst_name = index.metagraph().ntype_name(dst_type)?;
    let pairs: Vec<(NodeId, NodeId)> = reach.iter().map(|(src, dst, _)| (src, dst)).collect();
    let reachable = GraphIndex::bipartite(
        src_name,
        DEFAULT_ETYPE,
        dst_name,
        reach.shape(),
        &pairs,
        IndexMode::ReadOnly,
    )?;
    debug!(
        steps = steps.len(),
        edges = pairs.len(),
        from = src_name,
        to = dst_name,
        "built metapath reachable graph"
    );

    let mut node_frames = vec![FrameRef::new(graph.copy_node_frame(src_type))];
    if src_type != dst_type {
        node_frames.push(FrameRef::new(graph.copy_node_frame(dst_type)));
    }
    let edge_frames = vec![FrameRef::empty(pairs.len())];
    HeteroGraph::with_frames(reachable, node_frames, edge_frames)
}
