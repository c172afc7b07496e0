//! Configuration shared by transform drivers.
//!
//! The numeric backend is chosen here once and injected into the functions
//! that need one (`khop_adj`, the k-NN graph builders) instead of being looked
//! up globally.

use std::env;

use crate::{
    GraphIndexError,
    backend::TensorBackend,
    backend_selector::{BackendFactory, BackendKind},
    index::IndexMode,
};

/// Environment variable selecting the index mode of graphs built by drivers
/// (`readonly` or `mutable`).
pub const INDEX_MODE_ENV: &str = "HETEROGRAPH_INDEX_MODE";

/// # Examples
///
/// ```rust
/// use heterograph::{IndexMode, TransformConfig, backend_selector::BackendKind};
///
/// let cfg = TransformConfig::default().with_backend(BackendKind::Cpu);
/// assert_eq!(cfg.index_mode, IndexMode::ReadOnly);
/// assert_eq!(cfg.create_backend().unwrap().name(), "cpu");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransformConfig {
    pub backend: BackendKind,
    /// Mode of indexes produced by transforms that let the caller choose.
    pub index_mode: IndexMode,
}

impl TransformConfig {
    pub fn new(backend: BackendKind, index_mode: IndexMode) -> Self {
        Self {
            backend,
            index_mode,
        }
    }

    pub fn from_env() -> Self {
        let index_mode = match env::var(INDEX_MODE_ENV).as_deref() {
            Ok("mutable") => IndexMode::Mutable,
            _ => IndexMode::ReadOnly,
        };
        Self {
            backend: BackendKind::from_env(),
            index_mode,
        }
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_index_mode(mut self, index_mode: IndexMode) -> Self {
        self.index_mode = index_mode;
        self
    }

    pub fn readonly(&self) -> bool {
        self.index_mode == IndexMode::ReadOnly
    }

    pub fn create_backend(&self) -> Result<Box<dyn TensorBackend>, GraphIndexError> {
        BackendFactory::new(self.backend).create()
    }
}
