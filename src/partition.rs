use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::{
    errors::GraphIndexError,
    frame::{FeatureColumn, INNER_EDGE, INNER_NODE},
    graph::HeteroGraph,
    index::{EdgeId, NodeId},
    khop::ensure_homogeneous,
    remap::IdMapping,
    subgraph::induced_subgraph,
};

/// Splits a homogeneous graph by `node_part` (the partition of every node).
///
/// Each partition holds its own nodes, ascending, followed by the halo nodes
/// that reach them along in-edges within `num_hops` hops, nearest first and
/// ascending within a hop. The kept edges are the in-edges of every node
/// closer than `max(num_hops, 1)` hops, in original id order. Results carry
/// [`crate::NID`], [`crate::EID`], [`INNER_NODE`] and [`INNER_EDGE`].
pub fn partition_graph_with_halo(
    graph: &HeteroGraph,
    node_part: &[usize],
    num_hops: usize,
) -> Result<BTreeMap<usize, HeteroGraph>, GraphIndexError> {
    let index = graph.index();
    ensure_homogeneous(index, "partition_graph_with_halo")?;
    let num_nodes = index.num_nodes(0)?;
    if node_part.len() != num_nodes {
        return Err(GraphIndexError::invalid_argument(format!(
            "node_part has {} entries for {num_nodes} nodes",
            node_part.len()
        )));
    }
    let edges = index.edges(0)?;
    let in_csr = index.in_csr(0)?;
    let reach = num_hops.max(1);
    let parts: BTreeSet<usize> = node_part.iter().copied().collect();

    let mut result = BTreeMap::new();
    for part in parts {
        let mut distance: Vec<Option<usize>> = vec![None; num_nodes];
        let mut nodes: Vec<NodeId> = (0..num_nodes).filter(|&n| node_part[n] == part).collect();
        for &node in &nodes {
            distance[node] = Some(0);
        }
        let mut frontier = nodes.clone();
        for hop in 1..=num_hops {
            let mut found = Vec::new();
            for &node in &frontier {
                for &pred in in_csr.neighbors(node) {
                    if distance[pred].is_none() {
                        distance[pred] = Some(hop);
                        found.push(pred);
                    }
                }
            }
            if found.is_empty() {
                break;
            }
            found.sort_unstable();
            nodes.extend_from_slice(&found);
            frontier = found;
        }

        let kept: Vec<EdgeId> = edges
            .pairs()
            .enumerate()
            .filter(|(_, (src, dst))| {
                matches!(distance[*dst], Some(d) if d < reach) && distance[*src].is_some()
            })
            .map(|(eid, _)| eid)
            .collect();
        let inner_node: Vec<bool> = nodes.iter().map(|&n| node_part[n] == part).collect();
        let inner_edge: Vec<bool> = kept
            .iter()
            .map(|&eid| node_part[edges.dst[eid]] == part)
            .collect();

        let mapping = IdMapping::from_induced(nodes)?;
        let subgraph = induced_subgraph(graph, &[mapping], &[kept], false)?;
        subgraph
            .node_frame(0)?
            .write()
            .insert(INNER_NODE, FeatureColumn::Flags(inner_node))?;
        subgraph
            .edge_frame(0)?
            .write()
            .insert(INNER_EDGE, FeatureColumn::Flags(inner_edge))?;
        debug!(
            part,
            nodes = subgraph.total_nodes(),
            edges = subgraph.total_edges(),
            "built halo partition"
        );
        result.insert(part, subgraph);
    }
    info!(parts = result.len(), num_hops, "partitioned graph with halo");
    Ok(result)
}
