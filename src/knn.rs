use tracing::debug;

use crate::{
    backend::{DenseMatrix, TensorBackend},
    errors::GraphIndexError,
    graph::HeteroGraph,
    index::{GraphIndex, IndexMode, NodeId},
};

/// One graph over all point sets: every point receives an edge from each of
/// its `k` nearest points in the same set (squared Euclidean distance, the
/// point itself included). Sets are laid out one after another in the node
/// id space. Edges are ordered by `(src, dst)`.
pub fn knn_graph(
    backend: &dyn TensorBackend,
    point_sets: &[DenseMatrix],
    k: usize,
) -> Result<HeteroGraph, GraphIndexError> {
    let mut pairs: Vec<(NodeId, NodeId)> = Vec::new();
    let mut offset = 0;
    for points in point_sets {
        if k > points.rows() {
            return Err(GraphIndexError::invalid_argument(format!(
                "k = {k} exceeds a point set of {} points",
                points.rows()
            )));
        }
        let distances = backend.pairwise_squared_distance(points);
        let nearest = backend.topk_smallest(&distances, k)?;
        for (point, neighbors) in nearest.into_iter().enumerate() {
            for neighbor in neighbors {
                pairs.push((offset + neighbor, offset + point));
            }
        }
        offset += points.rows();
    }
    pairs.sort_unstable();
    debug!(
        backend = backend.name(),
        sets = point_sets.len(),
        nodes = offset,
        k,
        "built knn graph"
    );
    Ok(HeteroGraph::from_index(GraphIndex::from_pairs(
        offset,
        &pairs,
        IndexMode::ReadOnly,
    )?))
}

/// [`knn_graph`] over consecutive row blocks of `points` with the sizes in
/// `segs`, which must add up to the row count.
pub fn segmented_knn_graph(
    backend: &dyn TensorBackend,
    points: &DenseMatrix,
    k: usize,
    segs: &[usize],
) -> Result<HeteroGraph, GraphIndexError> {
    let blocks = points.split_rows(segs)?;
    knn_graph(backend, &blocks, k)
}
