use tracing::debug;

use crate::{
    errors::GraphIndexError,
    frame::{FeatureColumn, NID},
    graph::{HeteroGraph, NodeSelection},
    index::{GraphIndex, IndexMode, NodeId},
    remap::{IdRemapper, remap_edges},
};

#[derive(Debug, Clone, PartialEq)]
pub struct CompactedIndexes {
    pub indexes: Vec<GraphIndex>,
    /// Per node type: original id of every node in the shared compacted space.
    pub induced_nodes: Vec<Vec<NodeId>>,
}

/// Drops the nodes that are isolated in every input index and are not listed
/// in `always_preserve` (one id array per node type). All outputs share one
/// compacted node space per type, ordered by original id.
pub fn compact_indexes(
    indexes: &[&GraphIndex],
    always_preserve: &[Vec<NodeId>],
) -> Result<CompactedIndexes, GraphIndexError> {
    let Some(first) = indexes.first() else {
        return Ok(CompactedIndexes {
            indexes: Vec::new(),
            induced_nodes: Vec::new(),
        });
    };
    check_shared_node_space(first, indexes)?;
    if always_preserve.len() != first.num_ntypes() {
        return Err(GraphIndexError::schema_mismatch(format!(
            "{} preserve arrays given for {} node types",
            always_preserve.len(),
            first.num_ntypes()
        )));
    }

    let mut remapper = IdRemapper::new(first.node_counts());
    for (ntype, nodes) in always_preserve.iter().enumerate() {
        remapper.mark(ntype, nodes)?;
    }
    for index in indexes {
        remapper.mark_endpoints(index)?;
    }
    let mappings = remapper.finish();
    let counts: Vec<usize> = mappings.iter().map(|mapping| mapping.len()).collect();

    let mut compacted = Vec::with_capacity(indexes.len());
    for index in indexes {
        let edges = remap_edges(index, &mappings)?;
        compacted.push(GraphIndex::new(
            index.metagraph().clone(),
            counts.clone(),
            edges,
            IndexMode::ReadOnly,
        )?);
    }
    debug!(
        graphs = indexes.len(),
        before = first.total_nodes(),
        after = counts.iter().sum::<usize>(),
        "compacted graphs"
    );
    Ok(CompactedIndexes {
        indexes: compacted,
        induced_nodes: mappings.into_iter().map(|m| m.into_induced()).collect(),
    })
}

/// Compacts graphs that share one node set. Each result carries the mapping
/// to original node ids under [`NID`] for every node type; the mapping is the
/// same for all results. Node and edge features are not carried over.
///
/// Node types must appear in the same order in every graph.
pub fn compact_graphs(
    graphs: &[HeteroGraph],
    always_preserve: Option<&NodeSelection>,
) -> Result<Vec<HeteroGraph>, GraphIndexError> {
    let Some(first) = graphs.first() else {
        return Ok(Vec::new());
    };
    let indexes: Vec<&GraphIndex> = graphs.iter().map(HeteroGraph::index).collect();
    check_shared_node_space(first.index(), &indexes)?;
    let preserve = match always_preserve {
        Some(selection) => selection.resolve(first.metagraph(), first.index().node_counts())?,
        None => vec![Vec::new(); first.index().num_ntypes()],
    };
    let CompactedIndexes {
        indexes,
        induced_nodes,
    } = compact_indexes(&indexes, &preserve)?;
    let mut result = Vec::with_capacity(indexes.len());
    for index in indexes {
        let graph = HeteroGraph::from_index(index);
        for (ntype, induced) in induced_nodes.iter().enumerate() {
            graph
                .node_frame(ntype)?
                .write()
                .insert(NID, FeatureColumn::Ids(induced.clone()))?;
        }
        result.push(graph);
    }
    Ok(result)
}

fn check_shared_node_space(
    first: &GraphIndex,
    indexes: &[&GraphIndex],
) -> Result<(), GraphIndexError> {
    let ntypes = first.metagraph().ntypes();
    for index in indexes {
        if index.metagraph().ntypes() != ntypes {
            return Err(GraphIndexError::invalid_argument(format!(
                "all graphs should have the same node types in the same order, got {:?} and {:?}",
                ntypes,
                index.metagraph().ntypes()
            )));
        }
        if index.node_counts() != first.node_counts() {
            return Err(GraphIndexError::schema_mismatch(format!(
                "graphs disagree on node counts: {:?} vs {:?}",
                first.node_counts(),
                index.node_counts()
            )));
        }
    }
    Ok(())
}
