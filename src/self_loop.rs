use crate::{
    errors::GraphIndexError,
    graph::HeteroGraph,
    index::{EdgeList, GraphIndex, IndexMode},
};

/// New graph with every self-loop stripped and exactly one self-loop per node
/// appended after the remaining edges. Edge types between two different node
/// types pass through unchanged. The result is mutable and carries no
/// features.
pub fn add_self_loop(graph: &HeteroGraph) -> Result<HeteroGraph, GraphIndexError> {
    let index = graph.index();
    let mut edges = Vec::with_capacity(index.num_etypes());
    for (etype, list) in index.edge_lists().iter().enumerate() {
        if !is_square(index, etype)? {
            edges.push(list.clone());
            continue;
        }
        let (num_nodes, _) = index.endpoint_counts(etype)?;
        let mut out = strip_self_loops(list);
        for node in 0..num_nodes {
            out.push(node, node);
        }
        edges.push(out);
    }
    Ok(HeteroGraph::from_index(index.with_edges(edges, IndexMode::Mutable)?))
}

/// New mutable graph without self-loops; the remaining edges keep their
/// relative order.
pub fn remove_self_loop(graph: &HeteroGraph) -> Result<HeteroGraph, GraphIndexError> {
    let index = graph.index();
    let mut edges = Vec::with_capacity(index.num_etypes());
    for (etype, list) in index.edge_lists().iter().enumerate() {
        if is_square(index, etype)? {
            edges.push(strip_self_loops(list));
        } else {
            edges.push(list.clone());
        }
    }
    Ok(HeteroGraph::from_index(index.with_edges(edges, IndexMode::Mutable)?))
}

/// Appends a self-loop to every node lacking one, in place. Existing edge ids
/// stay valid and edge tables grow with default rows. Requires a mutable
/// graph whose tables are not shared with another graph. Returns the number
/// of edges added.
pub fn append_self_loops(graph: &mut HeteroGraph) -> Result<usize, GraphIndexError> {
    let mut pending = Vec::new();
    {
        let index = graph.index();
        for (etype, list) in index.edge_lists().iter().enumerate() {
            if !is_square(index, etype)? {
                continue;
            }
            let (num_nodes, _) = index.endpoint_counts(etype)?;
            let mut has_loop = vec![false; num_nodes];
            for (src, dst) in list.pairs() {
                if src == dst {
                    has_loop[src] = true;
                }
            }
            let missing: Vec<usize> = (0..num_nodes).filter(|&node| !has_loop[node]).collect();
            if !missing.is_empty() {
                pending.push((etype, missing));
            }
        }
    }
    let index = graph.index_mut()?;
    let mut added = Vec::with_capacity(pending.len());
    for (etype, nodes) in &pending {
        let range = index.add_edges(*etype, nodes, nodes)?;
        added.push((*etype, range.len()));
    }
    let mut total = 0;
    for (etype, count) in added {
        graph.edge_frame_by_id(etype).write().extend_rows(count);
        total += count;
    }
    Ok(total)
}

fn strip_self_loops(list: &EdgeList) -> EdgeList {
    let mut out = EdgeList::with_capacity(list.len());
    for (src, dst) in list.pairs() {
        if src != dst {
            out.push(src, dst);
        }
    }
    out
}

fn is_square(index: &GraphIndex, etype: usize) -> Result<bool, GraphIndexError> {
    Ok(index.metagraph().etype(etype)?.is_square())
}
