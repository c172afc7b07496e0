//! Per-type feature tables attached to a graph view.
//!
//! A [`Frame`] is a set of named columns, each holding one value per node (or
//! edge) of its type. Frames live behind a [`FrameRef`]; cloning a `FrameRef`
//! with [`FrameRef::share`] aliases the same table, while
//! [`FrameRef::detached`] copies it. Graphs whose frames are aliased refuse
//! topology edits until they are detached.

use std::{collections::BTreeMap, sync::Arc};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

use crate::errors::GraphIndexError;

/// Original node ids of an induced graph.
pub const NID: &str = "_ID";
/// Original edge ids of an induced graph.
pub const EID: &str = "_ID";
/// Whether a node of a halo partition is owned by that partition.
pub const INNER_NODE: &str = "inner_node";
/// Whether an edge of a halo partition is owned by that partition.
pub const INNER_EDGE: &str = "inner_edge";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum FeatureColumn {
    Ids(Vec<usize>),
    Counts(Vec<u64>),
    Flags(Vec<bool>),
    Values(Vec<f32>),
}

impl FeatureColumn {
    pub fn len(&self) -> usize {
        match self {
            FeatureColumn::Ids(values) => values.len(),
            FeatureColumn::Counts(values) => values.len(),
            FeatureColumn::Flags(values) => values.len(),
            FeatureColumn::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_ids(&self) -> Option<&[usize]> {
        match self {
            FeatureColumn::Ids(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_counts(&self) -> Option<&[u64]> {
        match self {
            FeatureColumn::Counts(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_flags(&self) -> Option<&[bool]> {
        match self {
            FeatureColumn::Flags(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_values(&self) -> Option<&[f32]> {
        match self {
            FeatureColumn::Values(values) => Some(values),
            _ => None,
        }
    }

    /// Appends `rows` zero/false entries.
    pub fn extend_default(&mut self, rows: usize) {
        match self {
            FeatureColumn::Ids(values) => values.resize(values.len() + rows, 0),
            FeatureColumn::Counts(values) => values.resize(values.len() + rows, 0),
            FeatureColumn::Flags(values) => values.resize(values.len() + rows, false),
            FeatureColumn::Values(values) => values.resize(values.len() + rows, 0.0),
        }
    }

    /// Rows picked by `positions`, in that order.
    pub fn gather(&self, positions: &[usize]) -> Result<FeatureColumn, GraphIndexError> {
        if let Some(&bad) = positions.iter().find(|&&pos| pos >= self.len()) {
            return Err(GraphIndexError::out_of_range(format!(
                "row {bad} of a {}-row column",
                self.len()
            )));
        }
        Ok(match self {
            FeatureColumn::Ids(values) => {
                FeatureColumn::Ids(positions.iter().map(|&pos| values[pos]).collect())
            }
            FeatureColumn::Counts(values) => {
                FeatureColumn::Counts(positions.iter().map(|&pos| values[pos]).collect())
            }
            FeatureColumn::Flags(values) => {
                FeatureColumn::Flags(positions.iter().map(|&pos| values[pos]).collect())
            }
            FeatureColumn::Values(values) => {
                FeatureColumn::Values(positions.iter().map(|&pos| values[pos]).collect())
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    num_rows: usize,
    columns: BTreeMap<String, FeatureColumn>,
}

impl Frame {
    pub fn new(num_rows: usize) -> Self {
        Self {
            num_rows,
            columns: BTreeMap::new(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn insert(&mut self, key: &str, column: FeatureColumn) -> Result<(), GraphIndexError> {
        if column.len() != self.num_rows {
            return Err(GraphIndexError::schema_mismatch(format!(
                "column {key} has {} rows, frame has {}",
                column.len(),
                self.num_rows
            )));
        }
        self.columns.insert(key.to_string(), column);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&FeatureColumn> {
        self.columns.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FeatureColumn> {
        self.columns.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.columns.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn extend_rows(&mut self, rows: usize) {
        self.num_rows += rows;
        for column in self.columns.values_mut() {
            column.extend_default(rows);
        }
    }

    pub fn gather(&self, positions: &[usize]) -> Result<Frame, GraphIndexError> {
        let mut out = Frame::new(positions.len());
        for (key, column) in &self.columns {
            out.columns.insert(key.clone(), column.gather(positions)?);
        }
        Ok(out)
    }
}

#[derive(Debug)]
pub struct FrameRef(Arc<RwLock<Frame>>);

impl FrameRef {
    pub fn new(frame: Frame) -> Self {
        Self(Arc::new(RwLock::new(frame)))
    }

    pub fn empty(num_rows: usize) -> Self {
        Self::new(Frame::new(num_rows))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Frame> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Frame> {
        self.0.write()
    }

    pub fn share(&self) -> FrameRef {
        FrameRef(Arc::clone(&self.0))
    }

    pub fn detached(&self) -> FrameRef {
        FrameRef::new(self.read().clone())
    }

    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.0) > 1
    }

    pub fn ptr_eq(&self, other: &FrameRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Which feature tables a derived graph aliases from its source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSharing {
    pub ndata: bool,
    pub edata: bool,
}

impl FrameSharing {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            ndata: true,
            edata: true,
        }
    }
}
