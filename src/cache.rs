use std::{fmt, sync::Arc};

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::sparse::Csr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Rows are source nodes, entries are destinations.
    Outgoing,
    /// Rows are destination nodes, entries are sources.
    Incoming,
}

/// Lazily built CSR/CSC views keyed by edge type and direction.
#[derive(Default)]
pub struct AdjacencyCache {
    inner: RwLock<AHashMap<(usize, Direction), Arc<Csr>>>,
}

impl AdjacencyCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(AHashMap::new()),
        }
    }

    pub fn get(&self, etype: usize, direction: Direction) -> Option<Arc<Csr>> {
        self.inner.read().get(&(etype, direction)).cloned()
    }

    pub fn insert(&self, etype: usize, direction: Direction, value: Csr) -> Arc<Csr> {
        let value = Arc::new(value);
        self.inner
            .write()
            .insert((etype, direction), Arc::clone(&value));
        value
    }

    pub fn get_or_build<F>(&self, etype: usize, direction: Direction, build: F) -> Arc<Csr>
    where
        F: FnOnce() -> Csr,
    {
        if let Some(cached) = self.get(etype, direction) {
            return cached;
        }
        // two readers may race to build; both results are identical
        self.insert(etype, direction, build())
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

impl Clone for AdjacencyCache {
    fn clone(&self) -> Self {
        Self {
            inner: RwLock::new(self.inner.read().clone()),
        }
    }
}

impl fmt::Debug for AdjacencyCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdjacencyCache")
            .field("entries", &self.len())
            .finish()
    }
}
