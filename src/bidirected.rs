use std::collections::BTreeSet;

use ahash::AHashMap;
use tracing::debug;

use crate::{
    errors::GraphIndexError,
    graph::HeteroGraph,
    index::{EdgeList, GraphIndex, IndexMode},
};

/// Bidirected edges of one edge list: with `m` copies of `i -> j` and `n`
/// copies of `j -> i` the result has `max(m, n)` copies of each. Self-loops
/// keep their multiplicity. Output is ordered by `(dst, src)`.
pub fn bidirect_edges(list: &EdgeList) -> EdgeList {
    let mut counts: AHashMap<(usize, usize), usize> = AHashMap::with_capacity(list.len());
    let mut targets = BTreeSet::new();
    for (src, dst) in list.pairs() {
        *counts.entry((src, dst)).or_insert(0) += 1;
        targets.insert((dst, src));
        targets.insert((src, dst));
    }
    let mut out = EdgeList::with_capacity(list.len() * 2);
    for (dst, src) in targets {
        let forward = counts.get(&(src, dst)).copied().unwrap_or(0);
        let backward = counts.get(&(dst, src)).copied().unwrap_or(0);
        for _ in 0..forward.max(backward) {
            out.push(src, dst);
        }
    }
    out
}

pub fn to_bidirected_index(
    index: &GraphIndex,
    mode: IndexMode,
) -> Result<GraphIndex, GraphIndexError> {
    for etype in index.metagraph().canonical_etypes() {
        if !etype.is_square() {
            return Err(GraphIndexError::invalid_argument(format!(
                "cannot bidirect edge type {etype}: endpoint node types differ"
            )));
        }
    }
    let edges: Vec<EdgeList> = index.edge_lists().iter().map(bidirect_edges).collect();
    let result = index.with_edges(edges, mode)?;
    debug!(
        before = index.total_edges(),
        after = result.total_edges(),
        "bidirected graph"
    );
    Ok(result)
}

/// Bidirected copy of `graph` without features. Every edge type is handled
/// on its own and must connect a node type to itself.
pub fn to_bidirected(graph: &HeteroGraph, readonly: bool) -> Result<HeteroGraph, GraphIndexError> {
    let mode = if readonly {
        IndexMode::ReadOnly
    } else {
        IndexMode::Mutable
    };
    Ok(HeteroGraph::from_index(to_bidirected_index(
        graph.index(),
        mode,
    )?))
}
