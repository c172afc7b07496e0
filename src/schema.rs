//! Node types, canonical edge types and the metagraph tying them together.

use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::errors::GraphIndexError;

/// Node type name used when a graph is built without explicit types.
pub const DEFAULT_NTYPE: &str = "_N";
/// Relation name used when a graph is built without explicit types.
pub const DEFAULT_ETYPE: &str = "_E";

/// (source node type, relation, destination node type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalEdgeType {
    pub src_type: String,
    pub relation: String,
    pub dst_type: String,
}

impl CanonicalEdgeType {
    pub fn new(
        src_type: impl Into<String>,
        relation: impl Into<String>,
        dst_type: impl Into<String>,
    ) -> Self {
        Self {
            src_type: src_type.into(),
            relation: relation.into(),
            dst_type: dst_type.into(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            src_type: self.dst_type.clone(),
            relation: self.relation.clone(),
            dst_type: self.src_type.clone(),
        }
    }

    pub fn is_square(&self) -> bool {
        self.src_type == self.dst_type
    }
}

impl fmt::Display for CanonicalEdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.src_type, self.relation, self.dst_type)
    }
}

/// An edge type named either by its relation alone or in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeTypeKey<'a> {
    Relation(&'a str),
    Canonical(&'a CanonicalEdgeType),
}

impl<'a> From<&'a str> for EdgeTypeKey<'a> {
    fn from(relation: &'a str) -> Self {
        EdgeTypeKey::Relation(relation)
    }
}

impl<'a> From<&'a CanonicalEdgeType> for EdgeTypeKey<'a> {
    fn from(etype: &'a CanonicalEdgeType) -> Self {
        EdgeTypeKey::Canonical(etype)
    }
}

/// Type schema of a graph. Node types and edge types are addressed by their
/// position, which is stable for the lifetime of an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metagraph {
    ntypes: Vec<String>,
    etypes: Vec<CanonicalEdgeType>,
}

impl Metagraph {
    pub fn new(
        ntypes: Vec<String>,
        etypes: Vec<CanonicalEdgeType>,
    ) -> Result<Self, GraphIndexError> {
        if ntypes.is_empty() {
            return Err(GraphIndexError::invalid_argument(
                "a graph needs at least one node type",
            ));
        }
        let mut seen = AHashSet::with_capacity(ntypes.len());
        for ntype in &ntypes {
            if ntype.trim().is_empty() {
                return Err(GraphIndexError::invalid_argument("node type must be set"));
            }
            if !seen.insert(ntype.as_str()) {
                return Err(GraphIndexError::invalid_argument(format!(
                    "duplicate node type {ntype}"
                )));
            }
        }
        let mut seen_etypes = AHashSet::with_capacity(etypes.len());
        for etype in &etypes {
            if etype.relation.trim().is_empty() {
                return Err(GraphIndexError::invalid_argument("edge type must be set"));
            }
            if !seen.contains(etype.src_type.as_str()) || !seen.contains(etype.dst_type.as_str())
            {
                return Err(GraphIndexError::invalid_argument(format!(
                    "edge type {etype} references an unknown node type"
                )));
            }
            if !seen_etypes.insert(etype) {
                return Err(GraphIndexError::invalid_argument(format!(
                    "duplicate edge type {etype}"
                )));
            }
        }
        Ok(Self { ntypes, etypes })
    }

    pub fn homogeneous() -> Self {
        Self {
            ntypes: vec![DEFAULT_NTYPE.to_string()],
            etypes: vec![CanonicalEdgeType::new(
                DEFAULT_NTYPE,
                DEFAULT_ETYPE,
                DEFAULT_NTYPE,
            )],
        }
    }

    /// Single relation between two node types. When both names coincide the
    /// metagraph has a single node type.
    pub fn bipartite(src_type: &str, relation: &str, dst_type: &str) -> Self {
        let ntypes = if src_type == dst_type {
            vec![src_type.to_string()]
        } else {
            vec![src_type.to_string(), dst_type.to_string()]
        };
        Self {
            ntypes,
            etypes: vec![CanonicalEdgeType::new(src_type, relation, dst_type)],
        }
    }

    pub fn ntypes(&self) -> &[String] {
        &self.ntypes
    }

    pub fn canonical_etypes(&self) -> &[CanonicalEdgeType] {
        &self.etypes
    }

    pub fn num_ntypes(&self) -> usize {
        self.ntypes.len()
    }

    pub fn num_etypes(&self) -> usize {
        self.etypes.len()
    }

    pub fn is_homogeneous(&self) -> bool {
        self.ntypes.len() == 1 && self.etypes.len() == 1
    }

    pub fn ntype_id(&self, name: &str) -> Result<usize, GraphIndexError> {
        self.ntypes
            .iter()
            .position(|ntype| ntype == name)
            .ok_or_else(|| GraphIndexError::invalid_argument(format!("unknown node type {name}")))
    }

    pub fn ntype_name(&self, id: usize) -> Result<&str, GraphIndexError> {
        self.ntypes
            .get(id)
            .map(String::as_str)
            .ok_or_else(|| GraphIndexError::out_of_range(format!("node type id {id}")))
    }

    pub fn etype(&self, id: usize) -> Result<&CanonicalEdgeType, GraphIndexError> {
        self.etypes
            .get(id)
            .ok_or_else(|| GraphIndexError::out_of_range(format!("edge type id {id}")))
    }

    /// Resolves a relation name. The name must identify exactly one canonical
    /// edge type.
    pub fn etype_id(&self, relation: &str) -> Result<usize, GraphIndexError> {
        let mut found = None;
        for (id, etype) in self.etypes.iter().enumerate() {
            if etype.relation == relation {
                if found.is_some() {
                    return Err(GraphIndexError::invalid_argument(format!(
                        "edge type {relation} is ambiguous, name it by its canonical edge type"
                    )));
                }
                found = Some(id);
            }
        }
        found.ok_or_else(|| {
            GraphIndexError::invalid_argument(format!("unknown edge type {relation}"))
        })
    }

    pub fn canonical_etype_id(&self, etype: &CanonicalEdgeType) -> Result<usize, GraphIndexError> {
        self.etypes
            .iter()
            .position(|candidate| candidate == etype)
            .ok_or_else(|| GraphIndexError::invalid_argument(format!("unknown edge type {etype}")))
    }

    pub fn key_etype_id(&self, key: EdgeTypeKey<'_>) -> Result<usize, GraphIndexError> {
        match key {
            EdgeTypeKey::Relation(relation) => self.etype_id(relation),
            EdgeTypeKey::Canonical(etype) => self.canonical_etype_id(etype),
        }
    }

    pub fn to_canonical_etype(&self, relation: &str) -> Result<&CanonicalEdgeType, GraphIndexError> {
        let id = self.etype_id(relation)?;
        Ok(&self.etypes[id])
    }

    /// Node type ids of the source and destination of an edge type.
    pub fn endpoint_types(&self, etype: usize) -> Result<(usize, usize), GraphIndexError> {
        let canonical = self.etype(etype)?;
        Ok((
            self.ntype_id(&canonical.src_type)?,
            self.ntype_id(&canonical.dst_type)?,
        ))
    }

    pub fn reversed(&self) -> Self {
        Self {
            ntypes: self.ntypes.clone(),
            etypes: self.etypes.iter().map(CanonicalEdgeType::reversed).collect(),
        }
    }

    /// Resolves a metapath and checks that every step starts where the
    /// previous one ended.
    pub fn resolve_metapath<'a, S>(&self, metapath: &[S]) -> Result<Vec<usize>, GraphIndexError>
    where
        S: Into<EdgeTypeKey<'a>> + Copy,
    {
        if metapath.is_empty() {
            return Err(GraphIndexError::invalid_argument("metapath must not be empty"));
        }
        let mut resolved = Vec::with_capacity(metapath.len());
        for &step in metapath {
            resolved.push(self.key_etype_id(step.into())?);
        }
        for pair in resolved.windows(2) {
            let prev = &self.etypes[pair[0]];
            let next = &self.etypes[pair[1]];
            if prev.dst_type != next.src_type {
                return Err(GraphIndexError::invalid_argument(format!(
                    "metapath step {next} does not start at {}",
                    prev.dst_type
                )));
            }
        }
        Ok(resolved)
    }
}

impl Default for Metagraph {
    fn default() -> Self {
        Self::homogeneous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn academic() -> Metagraph {
        Metagraph::new(
            vec!["author".into(), "paper".into(), "venue".into()],
            vec![
                CanonicalEdgeType::new("author", "writes", "paper"),
                CanonicalEdgeType::new("paper", "written-by", "author"),
                CanonicalEdgeType::new("paper", "published-in", "venue"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn metapath_must_chain() {
        let meta = academic();
        assert_eq!(meta.resolve_metapath(&["writes", "written-by"]).unwrap(), vec![0, 1]);
        let err = meta.resolve_metapath(&["writes", "writes"]).unwrap_err();
        assert!(matches!(err, GraphIndexError::InvalidArgument(_)));
    }

    #[test]
    fn ambiguous_relation_is_rejected() {
        let meta = Metagraph::new(
            vec!["a".into(), "b".into()],
            vec![
                CanonicalEdgeType::new("a", "link", "b"),
                CanonicalEdgeType::new("b", "link", "a"),
            ],
        )
        .unwrap();
        assert!(meta.etype_id("link").is_err());
        let canonical = CanonicalEdgeType::new("b", "link", "a");
        assert_eq!(meta.canonical_etype_id(&canonical).unwrap(), 1);
        assert_eq!(meta.key_etype_id(EdgeTypeKey::from(&canonical)).unwrap(), 1);
        let forward = CanonicalEdgeType::new("a", "link", "b");
        assert_eq!(meta.resolve_metapath(&[&forward, &canonical]).unwrap(), vec![0, 1]);
    }

    #[test]
    fn unknown_endpoint_type_fails() {
        let err = Metagraph::new(
            vec!["a".into()],
            vec![CanonicalEdgeType::new("a", "x", "missing")],
        )
        .unwrap_err();
        assert!(matches!(err, GraphIndexError::InvalidArgument(_)));
    }
}
