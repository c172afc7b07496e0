//! The immutable graph index: node counts per node type and an ordered edge
//! list per canonical edge type.
//!
//! Edge ids are positions in the per-type edge list and node ids are positions
//! in the per-type node range `[0, count)`. Every transform in this crate reads
//! a `GraphIndex` and produces a brand-new one; only an index built in
//! [`IndexMode::Mutable`] accepts appends.

use std::{ops::Range, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    cache::{AdjacencyCache, Direction},
    errors::GraphIndexError,
    schema::Metagraph,
    sparse::{Csr, SparseMatrix},
};

pub type NodeId = usize;
pub type EdgeId = usize;

/// Capability flag chosen at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexMode {
    #[default]
    ReadOnly,
    /// Append-only node and edge addition.
    Mutable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeList {
    pub src: Vec<NodeId>,
    pub dst: Vec<NodeId>,
}

impl EdgeList {
    pub fn new(src: Vec<NodeId>, dst: Vec<NodeId>) -> Result<Self, GraphIndexError> {
        if src.len() != dst.len() {
            return Err(GraphIndexError::invalid_argument(format!(
                "source and destination arrays differ in length ({} vs {})",
                src.len(),
                dst.len()
            )));
        }
        Ok(Self { src, dst })
    }

    pub fn from_pairs(pairs: &[(NodeId, NodeId)]) -> Self {
        Self {
            src: pairs.iter().map(|pair| pair.0).collect(),
            dst: pairs.iter().map(|pair| pair.1).collect(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            src: Vec::with_capacity(capacity),
            dst: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, src: NodeId, dst: NodeId) {
        self.src.push(src);
        self.dst.push(dst);
    }

    pub fn len(&self) -> usize {
        self.src.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.src.iter().copied().zip(self.dst.iter().copied())
    }

    pub fn to_pairs(&self) -> Vec<(NodeId, NodeId)> {
        self.pairs().collect()
    }
}

#[derive(Debug, Clone)]
pub struct GraphIndex {
    metagraph: Metagraph,
    num_nodes: Vec<usize>,
    edges: Vec<EdgeList>,
    mode: IndexMode,
    cache: AdjacencyCache,
}

impl PartialEq for GraphIndex {
    fn eq(&self, other: &Self) -> bool {
        self.metagraph == other.metagraph
            && self.num_nodes == other.num_nodes
            && self.edges == other.edges
            && self.mode == other.mode
    }
}

impl GraphIndex {
    pub fn new(
        metagraph: Metagraph,
        num_nodes: Vec<usize>,
        edges: Vec<EdgeList>,
        mode: IndexMode,
    ) -> Result<Self, GraphIndexError> {
        if num_nodes.len() != metagraph.num_ntypes() {
            return Err(GraphIndexError::schema_mismatch(format!(
                "{} node counts given for {} node types",
                num_nodes.len(),
                metagraph.num_ntypes()
            )));
        }
        if edges.len() != metagraph.num_etypes() {
            return Err(GraphIndexError::schema_mismatch(format!(
                "{} edge lists given for {} edge types",
                edges.len(),
                metagraph.num_etypes()
            )));
        }
        for (etype, list) in edges.iter().enumerate() {
            if list.src.len() != list.dst.len() {
                return Err(GraphIndexError::invalid_argument(format!(
                    "edge type {} has mismatched coordinate lengths",
                    metagraph.etype(etype)?
                )));
            }
            let (src_type, dst_type) = metagraph.endpoint_types(etype)?;
            check_endpoints(&list.src, num_nodes[src_type], "source")?;
            check_endpoints(&list.dst, num_nodes[dst_type], "destination")?;
        }
        debug!(
            ntypes = metagraph.num_ntypes(),
            etypes = metagraph.num_etypes(),
            edges = edges.iter().map(EdgeList::len).sum::<usize>(),
            "graph index built"
        );
        Ok(Self {
            metagraph,
            num_nodes,
            edges,
            mode,
            cache: AdjacencyCache::new(),
        })
    }

    pub fn from_coo(
        num_nodes: usize,
        src: &[NodeId],
        dst: &[NodeId],
        mode: IndexMode,
    ) -> Result<Self, GraphIndexError> {
        let list = EdgeList::new(src.to_vec(), dst.to_vec())?;
        Self::new(Metagraph::homogeneous(), vec![num_nodes], vec![list], mode)
    }

    pub fn from_pairs(
        num_nodes: usize,
        pairs: &[(NodeId, NodeId)],
        mode: IndexMode,
    ) -> Result<Self, GraphIndexError> {
        Self::new(
            Metagraph::homogeneous(),
            vec![num_nodes],
            vec![EdgeList::from_pairs(pairs)],
            mode,
        )
    }

    /// Single relation from `src_type` to `dst_type` with the given cardinalities.
    pub fn bipartite(
        src_type: &str,
        relation: &str,
        dst_type: &str,
        card: (usize, usize),
        pairs: &[(NodeId, NodeId)],
        mode: IndexMode,
    ) -> Result<Self, GraphIndexError> {
        let metagraph = Metagraph::bipartite(src_type, relation, dst_type);
        let num_nodes = if metagraph.num_ntypes() == 1 {
            if card.0 != card.1 {
                return Err(GraphIndexError::invalid_argument(format!(
                    "node type {src_type} given two cardinalities {} and {}",
                    card.0, card.1
                )));
            }
            vec![card.0]
        } else {
            vec![card.0, card.1]
        };
        Self::new(metagraph, num_nodes, vec![EdgeList::from_pairs(pairs)], mode)
    }

    /// Homogeneous index from a CSR. With [`Direction::Outgoing`] rows are
    /// sources, with [`Direction::Incoming`] rows are destinations. Edge ids
    /// follow the CSR entry order.
    pub fn from_csr(
        num_nodes: usize,
        indptr: &[usize],
        indices: &[NodeId],
        direction: Direction,
        mode: IndexMode,
    ) -> Result<Self, GraphIndexError> {
        let csr = Csr {
            num_rows: num_nodes,
            num_cols: num_nodes,
            indptr: indptr.to_vec(),
            indices: indices.to_vec(),
            edge_ids: (0..indices.len()).collect(),
        };
        csr.validate()?;
        let (rows, cols) = csr.to_coo();
        let list = match direction {
            Direction::Outgoing => EdgeList::new(rows, cols)?,
            Direction::Incoming => EdgeList::new(cols, rows)?,
        };
        Self::new(Metagraph::homogeneous(), vec![num_nodes], vec![list], mode)
    }

    /// New index over the same metagraph and node counts with different edges.
    pub fn with_edges(
        &self,
        edges: Vec<EdgeList>,
        mode: IndexMode,
    ) -> Result<Self, GraphIndexError> {
        Self::new(self.metagraph.clone(), self.num_nodes.clone(), edges, mode)
    }

    pub fn metagraph(&self) -> &Metagraph {
        &self.metagraph
    }

    pub fn mode(&self) -> IndexMode {
        self.mode
    }

    pub fn is_readonly(&self) -> bool {
        self.mode == IndexMode::ReadOnly
    }

    pub fn into_mode(mut self, mode: IndexMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn num_ntypes(&self) -> usize {
        self.num_nodes.len()
    }

    pub fn num_etypes(&self) -> usize {
        self.edges.len()
    }

    pub fn node_counts(&self) -> &[usize] {
        &self.num_nodes
    }

    pub fn edge_lists(&self) -> &[EdgeList] {
        &self.edges
    }

    pub fn num_nodes(&self, ntype: usize) -> Result<usize, GraphIndexError> {
        self.num_nodes
            .get(ntype)
            .copied()
            .ok_or_else(|| GraphIndexError::out_of_range(format!("node type id {ntype}")))
    }

    pub fn num_edges(&self, etype: usize) -> Result<usize, GraphIndexError> {
        Ok(self.edges(etype)?.len())
    }

    pub fn total_nodes(&self) -> usize {
        self.num_nodes.iter().sum()
    }

    pub fn total_edges(&self) -> usize {
        self.edges.iter().map(EdgeList::len).sum()
    }

    pub fn edges(&self, etype: usize) -> Result<&EdgeList, GraphIndexError> {
        self.edges
            .get(etype)
            .ok_or_else(|| GraphIndexError::out_of_range(format!("edge type id {etype}")))
    }

    pub fn find_edge(&self, etype: usize, eid: EdgeId) -> Result<(NodeId, NodeId), GraphIndexError> {
        let list = self.edges(etype)?;
        if eid >= list.len() {
            return Err(GraphIndexError::out_of_range(format!(
                "edge {eid} of {} edges",
                list.len()
            )));
        }
        Ok((list.src[eid], list.dst[eid]))
    }

    pub fn endpoint_counts(&self, etype: usize) -> Result<(usize, usize), GraphIndexError> {
        let (src_type, dst_type) = self.metagraph.endpoint_types(etype)?;
        Ok((self.num_nodes[src_type], self.num_nodes[dst_type]))
    }

    pub fn out_csr(&self, etype: usize) -> Result<Arc<Csr>, GraphIndexError> {
        self.csr(etype, Direction::Outgoing)
    }

    pub fn in_csr(&self, etype: usize) -> Result<Arc<Csr>, GraphIndexError> {
        self.csr(etype, Direction::Incoming)
    }

    pub fn csr(&self, etype: usize, direction: Direction) -> Result<Arc<Csr>, GraphIndexError> {
        let list = self.edges(etype)?;
        let (num_src, num_dst) = self.endpoint_counts(etype)?;
        Ok(self.cache.get_or_build(etype, direction, || match direction {
            Direction::Outgoing => Csr::from_coo(num_src, num_dst, &list.src, &list.dst),
            Direction::Incoming => Csr::from_coo(num_dst, num_src, &list.dst, &list.src),
        }))
    }

    pub fn out_degrees(&self, etype: usize) -> Result<Vec<usize>, GraphIndexError> {
        let csr = self.out_csr(etype)?;
        Ok((0..csr.num_rows).map(|row| csr.degree(row)).collect())
    }

    pub fn in_degrees(&self, etype: usize) -> Result<Vec<usize>, GraphIndexError> {
        let csr = self.in_csr(etype)?;
        Ok((0..csr.num_rows).map(|row| csr.degree(row)).collect())
    }

    pub fn out_degree(&self, etype: usize, node: NodeId) -> Result<usize, GraphIndexError> {
        let csr = self.out_csr(etype)?;
        check_row(&csr, node)?;
        Ok(csr.degree(node))
    }

    pub fn in_degree(&self, etype: usize, node: NodeId) -> Result<usize, GraphIndexError> {
        let csr = self.in_csr(etype)?;
        check_row(&csr, node)?;
        Ok(csr.degree(node))
    }

    pub fn successors(&self, etype: usize, node: NodeId) -> Result<Vec<NodeId>, GraphIndexError> {
        let csr = self.out_csr(etype)?;
        check_row(&csr, node)?;
        Ok(csr.neighbors(node).to_vec())
    }

    pub fn predecessors(&self, etype: usize, node: NodeId) -> Result<Vec<NodeId>, GraphIndexError> {
        let csr = self.in_csr(etype)?;
        check_row(&csr, node)?;
        Ok(csr.neighbors(node).to_vec())
    }

    pub fn out_edges(&self, etype: usize, node: NodeId) -> Result<Vec<EdgeId>, GraphIndexError> {
        let csr = self.out_csr(etype)?;
        check_row(&csr, node)?;
        Ok(csr.row_edge_ids(node).to_vec())
    }

    pub fn in_edges(&self, etype: usize, node: NodeId) -> Result<Vec<EdgeId>, GraphIndexError> {
        let csr = self.in_csr(etype)?;
        check_row(&csr, node)?;
        Ok(csr.row_edge_ids(node).to_vec())
    }

    pub fn edge_ids_between(
        &self,
        etype: usize,
        src: NodeId,
        dst: NodeId,
    ) -> Result<Vec<EdgeId>, GraphIndexError> {
        let csr = self.out_csr(etype)?;
        check_row(&csr, src)?;
        if dst >= csr.num_cols {
            return Err(GraphIndexError::out_of_range(format!(
                "node {dst} of {} nodes",
                csr.num_cols
            )));
        }
        Ok(csr
            .neighbors(src)
            .iter()
            .zip(csr.row_edge_ids(src))
            .filter(|(neighbor, _)| **neighbor == dst)
            .map(|(_, &eid)| eid)
            .collect())
    }

    pub fn has_edge_between(
        &self,
        etype: usize,
        src: NodeId,
        dst: NodeId,
    ) -> Result<bool, GraphIndexError> {
        Ok(!self.edge_ids_between(etype, src, dst)?.is_empty())
    }

    /// True when any edge type holds two edges with the same endpoints.
    pub fn is_multigraph(&self) -> bool {
        (0..self.num_etypes()).any(|etype| {
            self.out_csr(etype)
                .map(|csr| {
                    let mut row = Vec::new();
                    (0..csr.num_rows).any(|node| {
                        row.clear();
                        row.extend_from_slice(csr.neighbors(node));
                        row.sort_unstable();
                        row.windows(2).any(|w| w[0] == w[1])
                    })
                })
                .unwrap_or(false)
        })
    }

    /// Multiplicity matrix of an edge type. With [`Direction::Incoming`] rows
    /// are destinations and columns sources; with [`Direction::Outgoing`] rows
    /// are sources.
    pub fn adjacency_matrix(
        &self,
        etype: usize,
        direction: Direction,
    ) -> Result<SparseMatrix, GraphIndexError> {
        let list = self.edges(etype)?;
        let (num_src, num_dst) = self.endpoint_counts(etype)?;
        Ok(match direction {
            Direction::Outgoing => SparseMatrix::from_coo(num_src, num_dst, &list.src, &list.dst),
            Direction::Incoming => SparseMatrix::from_coo(num_dst, num_src, &list.dst, &list.src),
        })
    }

    pub fn add_nodes(&mut self, ntype: usize, count: usize) -> Result<Range<NodeId>, GraphIndexError> {
        self.ensure_mutable()?;
        let current = self.num_nodes(ntype)?;
        self.num_nodes[ntype] = current + count;
        self.cache.clear();
        Ok(current..current + count)
    }

    pub fn add_edge(
        &mut self,
        etype: usize,
        src: NodeId,
        dst: NodeId,
    ) -> Result<EdgeId, GraphIndexError> {
        let range = self.add_edges(etype, &[src], &[dst])?;
        Ok(range.start)
    }

    /// Appends edges; either all of them are added or none.
    pub fn add_edges(
        &mut self,
        etype: usize,
        src: &[NodeId],
        dst: &[NodeId],
    ) -> Result<Range<EdgeId>, GraphIndexError> {
        self.ensure_mutable()?;
        if src.len() != dst.len() {
            return Err(GraphIndexError::invalid_argument(
                "source and destination arrays differ in length",
            ));
        }
        let (num_src, num_dst) = self.endpoint_counts(etype)?;
        check_endpoints(src, num_src, "source")?;
        check_endpoints(dst, num_dst, "destination")?;
        let list = &mut self.edges[etype];
        let start = list.len();
        list.src.extend_from_slice(src);
        list.dst.extend_from_slice(dst);
        self.cache.clear();
        Ok(start..start + src.len())
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> &AdjacencyCache {
        &self.cache
    }

    fn ensure_mutable(&self) -> Result<(), GraphIndexError> {
        if self.mode == IndexMode::ReadOnly {
            return Err(GraphIndexError::invalid_argument(
                "graph index is readonly",
            ));
        }
        Ok(())
    }
}

fn check_endpoints(ids: &[NodeId], count: usize, side: &str) -> Result<(), GraphIndexError> {
    if let Some(&bad) = ids.iter().find(|&&id| id >= count) {
        return Err(GraphIndexError::out_of_range(format!(
            "{side} node {bad} exceeds node count {count}"
        )));
    }
    Ok(())
}

fn check_row(csr: &Csr, node: NodeId) -> Result<(), GraphIndexError> {
    if node >= csr.num_rows {
        return Err(GraphIndexError::out_of_range(format!(
            "node {node} of {} nodes",
            csr.num_rows
        )));
    }
    Ok(())
}

pub(crate) fn check_node_ids(ids: &[NodeId], count: usize) -> Result<(), GraphIndexError> {
    check_endpoints(ids, count, "requested")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_is_reset_after_append() {
        let mut index =
            GraphIndex::from_pairs(3, &[(0, 1)], IndexMode::Mutable).unwrap();
        assert_eq!(index.successors(0, 0).unwrap(), vec![1]);
        assert_eq!(index.cache().len(), 1);
        index.add_edge(0, 0, 2).unwrap();
        assert!(index.cache().is_empty());
        assert_eq!(index.successors(0, 0).unwrap(), vec![1, 2]);
    }
}
