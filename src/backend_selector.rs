use std::env;

use crate::{
    GraphIndexError,
    backend::{CpuBackend, TensorBackend},
};

pub const BACKEND_ENV: &str = "HETEROGRAPH_BACKEND";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    Cpu,
    #[default]
    Ndarray,
}

impl BackendKind {
    pub fn from_env() -> Self {
        match env::var(BACKEND_ENV).as_deref() {
            Ok("cpu") => BackendKind::Cpu,
            _ => BackendKind::default(),
        }
    }

    pub fn parse(name: &str) -> Result<Self, GraphIndexError> {
        match name {
            "cpu" => Ok(BackendKind::Cpu),
            "ndarray" => Ok(BackendKind::Ndarray),
            other => Err(GraphIndexError::invalid_argument(format!(
                "unknown backend {other}"
            ))),
        }
    }
}

pub struct BackendFactory {
    kind: BackendKind,
}

impl BackendFactory {
    pub fn new(kind: BackendKind) -> Self {
        Self { kind }
    }

    pub fn from_env() -> Self {
        Self::new(BackendKind::from_env())
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn create(&self) -> Result<Box<dyn TensorBackend>, GraphIndexError> {
        match self.kind {
            BackendKind::Cpu => Ok(Box::new(CpuBackend)),
            #[cfg(feature = "ndarray-backend")]
            BackendKind::Ndarray => Ok(Box::new(crate::backend::NdarrayBackend)),
            #[cfg(not(feature = "ndarray-backend"))]
            BackendKind::Ndarray => Err(GraphIndexError::invalid_argument(
                "ndarray backend not compiled in (enable the ndarray-backend feature)",
            )),
        }
    }
}
