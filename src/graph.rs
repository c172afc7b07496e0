//! Graph view: an index plus the feature tables of every node and edge type.

use std::{collections::BTreeMap, ops::Range, sync::Arc};

use crate::{
    errors::GraphIndexError,
    frame::{FeatureColumn, Frame, FrameRef},
    index::{EdgeId, EdgeList, GraphIndex, IndexMode, NodeId, check_node_ids},
    schema::{CanonicalEdgeType, Metagraph},
};

#[derive(Debug)]
pub struct HeteroGraph {
    index: Arc<GraphIndex>,
    node_frames: Vec<FrameRef>,
    edge_frames: Vec<FrameRef>,
}

impl HeteroGraph {
    pub fn from_index(index: GraphIndex) -> Self {
        let node_frames = index
            .node_counts()
            .iter()
            .map(|&count| FrameRef::empty(count))
            .collect();
        let edge_frames = index
            .edge_lists()
            .iter()
            .map(|list| FrameRef::empty(list.len()))
            .collect();
        Self {
            index: Arc::new(index),
            node_frames,
            edge_frames,
        }
    }

    pub fn with_frames(
        index: GraphIndex,
        node_frames: Vec<FrameRef>,
        edge_frames: Vec<FrameRef>,
    ) -> Result<Self, GraphIndexError> {
        if node_frames.len() != index.num_ntypes() || edge_frames.len() != index.num_etypes() {
            return Err(GraphIndexError::schema_mismatch(
                "one feature table is needed per node type and per edge type",
            ));
        }
        for (ntype, frame) in node_frames.iter().enumerate() {
            let rows = frame.read().num_rows();
            if rows != index.node_counts()[ntype] {
                return Err(GraphIndexError::schema_mismatch(format!(
                    "node table {} has {rows} rows for {} nodes",
                    index.metagraph().ntype_name(ntype)?,
                    index.node_counts()[ntype]
                )));
            }
        }
        for (etype, frame) in edge_frames.iter().enumerate() {
            let rows = frame.read().num_rows();
            if rows != index.edge_lists()[etype].len() {
                return Err(GraphIndexError::schema_mismatch(format!(
                    "edge table {} has {rows} rows for {} edges",
                    index.metagraph().etype(etype)?,
                    index.edge_lists()[etype].len()
                )));
            }
        }
        Ok(Self {
            index: Arc::new(index),
            node_frames,
            edge_frames,
        })
    }

    /// Readonly homogeneous graph from `(src, dst)` pairs.
    pub fn homogeneous(
        num_nodes: usize,
        pairs: &[(NodeId, NodeId)],
    ) -> Result<Self, GraphIndexError> {
        Ok(Self::from_index(GraphIndex::from_pairs(
            num_nodes,
            pairs,
            IndexMode::ReadOnly,
        )?))
    }

    /// Readonly single-relation graph between two node types.
    pub fn bipartite(
        src_type: &str,
        relation: &str,
        dst_type: &str,
        card: (usize, usize),
        pairs: &[(NodeId, NodeId)],
    ) -> Result<Self, GraphIndexError> {
        Ok(Self::from_index(GraphIndex::bipartite(
            src_type,
            relation,
            dst_type,
            card,
            pairs,
            IndexMode::ReadOnly,
        )?))
    }

    pub fn index(&self) -> &GraphIndex {
        &self.index
    }

    pub fn metagraph(&self) -> &Metagraph {
        self.index.metagraph()
    }

    pub fn ntypes(&self) -> &[String] {
        self.index.metagraph().ntypes()
    }

    pub fn canonical_etypes(&self) -> &[CanonicalEdgeType] {
        self.index.metagraph().canonical_etypes()
    }

    pub fn is_homogeneous(&self) -> bool {
        self.index.metagraph().is_homogeneous()
    }

    pub fn is_readonly(&self) -> bool {
        self.index.is_readonly()
    }

    pub fn ntype_id(&self, ntype: &str) -> Result<usize, GraphIndexError> {
        self.index.metagraph().ntype_id(ntype)
    }

    pub fn etype_id(&self, etype: &str) -> Result<usize, GraphIndexError> {
        self.index.metagraph().etype_id(etype)
    }

    /// The only node type; fails on graphs with several.
    pub fn single_ntype(&self) -> Result<usize, GraphIndexError> {
        if self.index.num_ntypes() != 1 {
            return Err(GraphIndexError::invalid_argument(
                "node type must be specified when the graph has several node types",
            ));
        }
        Ok(0)
    }

    /// The only edge type; fails on graphs with several.
    pub fn single_etype(&self) -> Result<usize, GraphIndexError> {
        if self.index.num_etypes() != 1 {
            return Err(GraphIndexError::invalid_argument(
                "edge type must be specified when the graph has several edge types",
            ));
        }
        Ok(0)
    }

    pub fn num_nodes(&self, ntype: &str) -> Result<usize, GraphIndexError> {
        self.index.num_nodes(self.ntype_id(ntype)?)
    }

    pub fn num_edges(&self, etype: &str) -> Result<usize, GraphIndexError> {
        self.index.num_edges(self.etype_id(etype)?)
    }

    pub fn total_nodes(&self) -> usize {
        self.index.total_nodes()
    }

    pub fn total_edges(&self) -> usize {
        self.index.total_edges()
    }

    pub fn edges(&self, etype: &str) -> Result<&EdgeList, GraphIndexError> {
        self.index.edges(self.etype_id(etype)?)
    }

    /// Edges of a single-edge-type graph as `(src, dst)` pairs in id order.
    pub fn edge_pairs(&self) -> Result<Vec<(NodeId, NodeId)>, GraphIndexError> {
        Ok(self.index.edges(self.single_etype()?)?.to_pairs())
    }

    pub fn node_frame(&self, ntype: usize) -> Result<&FrameRef, GraphIndexError> {
        self.node_frames
            .get(ntype)
            .ok_or_else(|| GraphIndexError::out_of_range(format!("node type id {ntype}")))
    }

    pub fn edge_frame(&self, etype: usize) -> Result<&FrameRef, GraphIndexError> {
        self.edge_frames
            .get(etype)
            .ok_or_else(|| GraphIndexError::out_of_range(format!("edge type id {etype}")))
    }

    pub fn node_feature(
        &self,
        ntype: &str,
        key: &str,
    ) -> Result<Option<FeatureColumn>, GraphIndexError> {
        let frame = self.node_frame(self.ntype_id(ntype)?)?;
        Ok(frame.read().get(key).cloned())
    }

    pub fn set_node_feature(
        &self,
        ntype: &str,
        key: &str,
        column: FeatureColumn,
    ) -> Result<(), GraphIndexError> {
        let frame = self.node_frame(self.ntype_id(ntype)?)?;
        frame.write().insert(key, column)
    }

    pub fn edge_feature(
        &self,
        etype: &str,
        key: &str,
    ) -> Result<Option<FeatureColumn>, GraphIndexError> {
        let frame = self.edge_frame(self.etype_id(etype)?)?;
        Ok(frame.read().get(key).cloned())
    }

    pub fn set_edge_feature(
        &self,
        etype: &str,
        key: &str,
        column: FeatureColumn,
    ) -> Result<(), GraphIndexError> {
        let frame = self.edge_frame(self.etype_id(etype)?)?;
        frame.write().insert(key, column)
    }

    pub fn ndata(&self, key: &str) -> Result<Option<FeatureColumn>, GraphIndexError> {
        let frame = self.node_frame(self.single_ntype()?)?;
        Ok(frame.read().get(key).cloned())
    }

    pub fn edata(&self, key: &str) -> Result<Option<FeatureColumn>, GraphIndexError> {
        let frame = self.edge_frame(self.single_etype()?)?;
        Ok(frame.read().get(key).cloned())
    }

    pub fn has_shared_frames(&self) -> bool {
        self.node_frames
            .iter()
            .chain(&self.edge_frames)
            .any(FrameRef::is_shared)
    }

    /// Replaces every aliased feature table with a private copy.
    pub fn detach_frames(&mut self) {
        for frame in self.node_frames.iter_mut().chain(self.edge_frames.iter_mut()) {
            if frame.is_shared() {
                *frame = frame.detached();
            }
        }
    }

    /// Appends nodes to a mutable graph; node tables grow with default rows.
    pub fn add_nodes(
        &mut self,
        ntype: &str,
        count: usize,
    ) -> Result<Range<NodeId>, GraphIndexError> {
        let ntype = self.ntype_id(ntype)?;
        self.ensure_editable()?;
        let range = Arc::make_mut(&mut self.index).add_nodes(ntype, count)?;
        self.node_frames[ntype].write().extend_rows(count);
        Ok(range)
    }

    /// Appends edges to a mutable graph; edge tables grow with default rows.
    pub fn add_edges(
        &mut self,
        etype: &str,
        src: &[NodeId],
        dst: &[NodeId],
    ) -> Result<Range<EdgeId>, GraphIndexError> {
        let etype = self.etype_id(etype)?;
        self.ensure_editable()?;
        let range = Arc::make_mut(&mut self.index).add_edges(etype, src, dst)?;
        self.edge_frames[etype].write().extend_rows(range.len());
        Ok(range)
    }

    pub(crate) fn index_mut(&mut self) -> Result<&mut GraphIndex, GraphIndexError> {
        self.ensure_editable()?;
        Ok(Arc::make_mut(&mut self.index))
    }

    pub(crate) fn edge_frame_by_id(&self, etype: usize) -> &FrameRef {
        &self.edge_frames[etype]
    }

    pub(crate) fn copy_node_frame(&self, ntype: usize) -> Frame {
        self.node_frames[ntype].read().clone()
    }

    fn ensure_editable(&self) -> Result<(), GraphIndexError> {
        if self.index.is_readonly() {
            return Err(GraphIndexError::invalid_argument("graph index is readonly"));
        }
        if self.has_shared_frames() {
            return Err(GraphIndexError::schema_mismatch(
                "feature tables are shared with another graph; detach them before editing topology",
            ));
        }
        Ok(())
    }
}

impl Clone for HeteroGraph {
    /// Clones share the index but never the feature tables.
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
            node_frames: self.node_frames.iter().map(FrameRef::detached).collect(),
            edge_frames: self.edge_frames.iter().map(FrameRef::detached).collect(),
        }
    }
}

/// Nodes requested by a caller, either for the only node type or per type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSelection {
    Untyped(Vec<NodeId>),
    Typed(BTreeMap<String, Vec<NodeId>>),
}

impl NodeSelection {
    pub fn typed<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<NodeId>)>,
        S: Into<String>,
    {
        NodeSelection::Typed(
            entries
                .into_iter()
                .map(|(ntype, ids)| (ntype.into(), ids))
                .collect(),
        )
    }

    /// One id array per node type of `metagraph`. Node types absent from a
    /// typed selection resolve to an empty array.
    pub fn resolve(
        &self,
        metagraph: &Metagraph,
        node_counts: &[usize],
    ) -> Result<Vec<Vec<NodeId>>, GraphIndexError> {
        let mut resolved = vec![Vec::new(); metagraph.num_ntypes()];
        match self {
            NodeSelection::Untyped(ids) => {
                if metagraph.num_ntypes() != 1 {
                    return Err(GraphIndexError::invalid_argument(
                        "node type must be specified when the graph has several node types",
                    ));
                }
                resolved[0] = ids.clone();
            }
            NodeSelection::Typed(entries) => {
                for (ntype, ids) in entries {
                    resolved[metagraph.ntype_id(ntype)?] = ids.clone();
                }
            }
        }
        for (ntype, ids) in resolved.iter().enumerate() {
            check_node_ids(ids, node_counts[ntype])?;
        }
        Ok(resolved)
    }
}

impl From<Vec<NodeId>> for NodeSelection {
    fn from(ids: Vec<NodeId>) -> Self {
        NodeSelection::Untyped(ids)
    }
}

impl From<&[NodeId]> for NodeSelection {
    fn from(ids: &[NodeId]) -> Self {
        NodeSelection::Untyped(ids.to_vec())
    }
}
