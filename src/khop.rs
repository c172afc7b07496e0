use tracing::debug;

use crate::{
    backend::{DenseMatrix, TensorBackend},
    cache::Direction,
    errors::GraphIndexError,
    graph::HeteroGraph,
    index::{EdgeList, GraphIndex, IndexMode},
    sparse::SparseMatrix,
};

/// `A^k` where `A[dst][src]` counts the edges `src -> dst`. Entries are walk
/// counts, so parallel edges multiply through.
pub fn khop_matrix(index: &GraphIndex, k: u32) -> Result<SparseMatrix, GraphIndexError> {
    ensure_homogeneous(index, "khop")?;
    let adjacency = index.adjacency_matrix(0, Direction::Incoming)?;
    let power = adjacency.pow(k)?;
    debug!(k, nnz = power.nnz(), "computed adjacency power");
    Ok(power)
}

/// Dense `A^k` produced through `backend`.
pub fn khop_adj(
    backend: &dyn TensorBackend,
    graph: &HeteroGraph,
    k: u32,
) -> Result<DenseMatrix, GraphIndexError> {
    let power = khop_matrix(graph.index(), k)?;
    Ok(backend.dense_from_sparse(&power))
}

/// Graph whose adjacency matrix is `A^k`: one edge per length-`k` walk,
/// emitted in (dst, src) order.
pub fn khop_graph(graph: &HeteroGraph, k: u32) -> Result<HeteroGraph, GraphIndexError> {
    let power = khop_matrix(graph.index(), k)?;
    let total = usize::try_from(power.total())
        .map_err(|_| GraphIndexError::out_of_range("k-hop graph too large"))?;
    let mut list = EdgeList::with_capacity(total);
    for (dst, src, multiplicity) in power.iter() {
        for _ in 0..multiplicity {
            list.push(src, dst);
        }
    }
    let index = graph.index().with_edges(vec![list], IndexMode::ReadOnly)?;
    Ok(HeteroGraph::from_index(index))
}

pub(crate) fn ensure_homogeneous(index: &GraphIndex, op: &str) -> Result<(), GraphIndexError> {
    if !index.metagraph().is_homogeneous() {
        return Err(GraphIndexError::invalid_argument(format!(
            "{op} requires a graph with one node type and one edge type"
        )));
    }
    Ok(())
}
