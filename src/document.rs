//! JSON form of a graph, read and written by the command line tool.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    errors::GraphIndexError,
    frame::{FeatureColumn, Frame, FrameRef},
    graph::HeteroGraph,
    index::{EdgeList, GraphIndex, IndexMode, NodeId},
    schema::{CanonicalEdgeType, DEFAULT_ETYPE, DEFAULT_NTYPE, Metagraph},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTypeDocument {
    pub name: String,
    pub num_nodes: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, FeatureColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeTypeDocument {
    pub src_type: String,
    pub relation: String,
    pub dst_type: String,
    pub src: Vec<NodeId>,
    pub dst: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub features: BTreeMap<String, FeatureColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub node_types: Vec<NodeTypeDocument>,
    pub edge_types: Vec<EdgeTypeDocument>,
    #[serde(default)]
    pub mode: IndexMode,
}

impl GraphDocument {
    pub fn homogeneous(num_nodes: usize, pairs: &[(NodeId, NodeId)]) -> Self {
        let list = EdgeList::from_pairs(pairs);
        Self {
            node_types: vec![NodeTypeDocument {
                name: DEFAULT_NTYPE.to_string(),
                num_nodes,
                features: BTreeMap::new(),
            }],
            edge_types: vec![EdgeTypeDocument {
                src_type: DEFAULT_NTYPE.to_string(),
                relation: DEFAULT_ETYPE.to_string(),
                dst_type: DEFAULT_NTYPE.to_string(),
                src: list.src,
                dst: list.dst,
                features: BTreeMap::new(),
            }],
            mode: IndexMode::ReadOnly,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, GraphIndexError> {
        serde_json::from_str(text).map_err(|e| GraphIndexError::serialization(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, GraphIndexError> {
        serde_json::to_string_pretty(self).map_err(|e| GraphIndexError::serialization(e.to_string()))
    }

    /// Snapshot of `graph`, features included.
    pub fn from_graph(graph: &HeteroGraph) -> Result<Self, GraphIndexError> {
        let index = graph.index();
        let mut node_types = Vec::with_capacity(index.num_ntypes());
        for (ntype, name) in index.metagraph().ntypes().iter().enumerate() {
            node_types.push(NodeTypeDocument {
                name: name.clone(),
                num_nodes: index.node_counts()[ntype],
                features: frame_columns(&graph.node_frame(ntype)?.read()),
            });
        }
        let mut edge_types = Vec::with_capacity(index.num_etypes());
        for (etype, canonical) in index.metagraph().canonical_etypes().iter().enumerate() {
            let list = index.edges(etype)?;
            edge_types.push(EdgeTypeDocument {
                src_type: canonical.src_type.clone(),
                relation: canonical.relation.clone(),
                dst_type: canonical.dst_type.clone(),
                src: list.src.clone(),
                dst: list.dst.clone(),
                features: frame_columns(&graph.edge_frame(etype)?.read()),
            });
        }
        Ok(Self {
            node_types,
            edge_types,
            mode: index.mode(),
        })
    }

    pub fn into_graph(self) -> Result<HeteroGraph, GraphIndexError> {
        let ntypes = self.node_types.iter().map(|n| n.name.clone()).collect();
        let etypes = self
            .edge_types
            .iter()
            .map(|e| CanonicalEdgeType::new(&e.src_type, &e.relation, &e.dst_type))
            .collect();
        let metagraph = Metagraph::new(ntypes, etypes)?;
        let counts = self.node_types.iter().map(|n| n.num_nodes).collect();
        let mut edges = Vec::with_capacity(self.edge_types.len());
        let mut edge_columns = Vec::with_capacity(self.edge_types.len());
        for edge_type in self.edge_types {
            edges.push(EdgeList::new(edge_type.src, edge_type.dst)?);
            edge_columns.push(edge_type.features);
        }
        let index = GraphIndex::new(metagraph, counts, edges, self.mode)?;

        let mut node_frames = Vec::with_capacity(self.node_types.len());
        for node_type in self.node_types {
            node_frames.push(build_frame(node_type.num_nodes, node_type.features)?);
        }
        let mut edge_frames = Vec::with_capacity(edge_columns.len());
        for (list, columns) in index.edge_lists().iter().zip(edge_columns) {
            edge_frames.push(build_frame(list.len(), columns)?);
        }
        HeteroGraph::with_frames(index, node_frames, edge_frames)
    }
}

fn frame_columns(frame: &Frame) -> BTreeMap<String, FeatureColumn> {
    frame
        .keys()
        .filter_map(|key| frame.get(key).map(|column| (key.to_string(), column.clone())))
        .collect()
}

fn build_frame(
    rows: usize,
    columns: BTreeMap<String, FeatureColumn>,
) -> Result<FrameRef, GraphIndexError> {
    let mut frame = Frame::new(rows);
    for (key, column) in columns {
        frame.insert(&key, column)?;
    }
    Ok(FrameRef::new(frame))
}
