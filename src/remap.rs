//! Induced id bookkeeping for transforms that shrink or reorder an id space.

use ahash::AHashMap;

use crate::{
    errors::GraphIndexError,
    index::{EdgeList, GraphIndex, NodeId},
};

/// Bidirectional mapping between an original id space and a new, denser one.
/// Position `i` of [`IdMapping::induced`] is the original id of new id `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMapping {
    induced: Vec<usize>,
    lookup: AHashMap<usize, usize>,
}

impl IdMapping {
    pub fn from_induced(induced: Vec<usize>) -> Result<Self, GraphIndexError> {
        let mut lookup = AHashMap::with_capacity(induced.len());
        for (new_id, &old_id) in induced.iter().enumerate() {
            if lookup.insert(old_id, new_id).is_some() {
                return Err(GraphIndexError::invalid_argument(format!(
                    "id {old_id} appears twice in induced mapping"
                )));
            }
        }
        Ok(Self { induced, lookup })
    }

    /// Keeps every position whose mask entry is set, in ascending order.
    pub fn from_mask(mask: &[bool]) -> Self {
        let induced: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter(|(_, keep)| **keep)
            .map(|(id, _)| id)
            .collect();
        let lookup = induced
            .iter()
            .enumerate()
            .map(|(new_id, &old_id)| (old_id, new_id))
            .collect();
        Self { induced, lookup }
    }

    pub fn len(&self) -> usize {
        self.induced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.induced.is_empty()
    }

    pub fn to_new(&self, old_id: usize) -> Option<usize> {
        self.lookup.get(&old_id).copied()
    }

    pub fn to_old(&self, new_id: usize) -> Option<usize> {
        self.induced.get(new_id).copied()
    }

    pub fn induced(&self) -> &[usize] {
        &self.induced
    }

    pub fn into_induced(self) -> Vec<usize> {
        self.induced
    }

    /// Translates original ids; fails if any of them was dropped.
    pub fn remap(&self, ids: &[usize]) -> Result<Vec<usize>, GraphIndexError> {
        ids.iter()
            .map(|&id| {
                self.to_new(id).ok_or_else(|| {
                    GraphIndexError::out_of_range(format!("id {id} is not part of the mapping"))
                })
            })
            .collect()
    }
}

/// Accumulates, per node type, the set of node ids that must survive a
/// compaction. Several graphs sharing one node space can be marked into the
/// same remapper so that they end up with a common new id space.
#[derive(Debug, Clone)]
pub struct IdRemapper {
    keep: Vec<Vec<bool>>,
}

impl IdRemapper {
    pub fn new(node_counts: &[usize]) -> Self {
        Self {
            keep: node_counts.iter().map(|&count| vec![false; count]).collect(),
        }
    }

    pub fn mark(&mut self, ntype: usize, ids: &[NodeId]) -> Result<(), GraphIndexError> {
        let mask = self
            .keep
            .get_mut(ntype)
            .ok_or_else(|| GraphIndexError::out_of_range(format!("node type id {ntype}")))?;
        let count = mask.len();
        if let Some(&bad) = ids.iter().find(|&&id| id >= count) {
            return Err(GraphIndexError::out_of_range(format!(
                "node {bad} exceeds node count {count}"
            )));
        }
        for &id in ids {
            mask[id] = true;
        }
        Ok(())
    }

    /// Marks every node that is an endpoint of at least one edge of `index`.
    pub fn mark_endpoints(&mut self, index: &GraphIndex) -> Result<(), GraphIndexError> {
        if index.node_counts().len() != self.keep.len() {
            return Err(GraphIndexError::schema_mismatch(format!(
                "graph has {} node types, expected {}",
                index.node_counts().len(),
                self.keep.len()
            )));
        }
        for (etype, list) in index.edge_lists().iter().enumerate() {
            let (src_type, dst_type) = index.metagraph().endpoint_types(etype)?;
            self.mark(src_type, &list.src)?;
            self.mark(dst_type, &list.dst)?;
        }
        Ok(())
    }

    pub fn finish(self) -> Vec<IdMapping> {
        self.keep.iter().map(|mask| IdMapping::from_mask(mask)).collect()
    }
}

/// Re-expresses every edge of `index` in the new node id spaces.
pub fn remap_edges(
    index: &GraphIndex,
    mappings: &[IdMapping],
) -> Result<Vec<EdgeList>, GraphIndexError> {
    let mut remapped = Vec::with_capacity(index.num_etypes());
    for (etype, list) in index.edge_lists().iter().enumerate() {
        let (src_type, dst_type) = index.metagraph().endpoint_types(etype)?;
        remapped.push(EdgeList::new(
            mappings[src_type].remap(&list.src)?,
            mappings[dst_type].remap(&list.dst)?,
        )?);
    }
    Ok(remapped)
}
