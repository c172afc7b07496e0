//! Structural inspection of a graph index.

use std::fmt;

use serde::Serialize;

use crate::{errors::GraphIndexError, index::GraphIndex};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Edges repeating an earlier `(src, dst)` pair of the same edge type.
    pub parallel_edges: usize,
    pub self_loops: usize,
    /// Nodes with no incident edge of any type.
    pub isolated_nodes: usize,
}

impl IndexReport {
    pub fn merge(&mut self, other: &IndexReport) {
        self.total_nodes = self.total_nodes.max(other.total_nodes);
        self.total_edges = self.total_edges.max(other.total_edges);
        self.parallel_edges += other.parallel_edges;
        self.self_loops += other.self_loops;
        self.isolated_nodes += other.isolated_nodes;
    }

    /// Whether a strict check should refuse the index. Isolated nodes are
    /// reported but not treated as an issue.
    pub fn has_issues(&self) -> bool {
        self.parallel_edges > 0 || self.self_loops > 0
    }
}

#[derive(Debug)]
pub struct IndexCheckError {
    pub report: IndexReport,
    pub source: Option<GraphIndexError>,
}

impl fmt::Display for IndexCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "index is not simple: {} parallel edges, {} self-loops",
            self.report.parallel_edges, self.report.self_loops
        )
    }
}

impl std::error::Error for IndexCheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err as &dyn std::error::Error)
    }
}

pub fn count_parallel_edges(index: &GraphIndex) -> Result<IndexReport, GraphIndexError> {
    let mut report = base_report(index);
    for etype in 0..index.num_etypes() {
        let csr = index.out_csr(etype)?;
        let mut scratch = Vec::new();
        for row in 0..csr.num_rows {
            scratch.clear();
            scratch.extend_from_slice(csr.neighbors(row));
            scratch.sort_unstable();
            report.parallel_edges += scratch.windows(2).filter(|w| w[0] == w[1]).count();
        }
    }
    Ok(report)
}

pub fn count_self_loops(index: &GraphIndex) -> Result<IndexReport, GraphIndexError> {
    let mut report = base_report(index);
    for (etype, list) in index.edge_lists().iter().enumerate() {
        if !index.metagraph().etype(etype)?.is_square() {
            continue;
        }
        report.self_loops += list.pairs().filter(|(src, dst)| src == dst).count();
    }
    Ok(report)
}

pub fn count_isolated_nodes(index: &GraphIndex) -> Result<IndexReport, GraphIndexError> {
    let mut report = base_report(index);
    let mut touched: Vec<Vec<bool>> = index
        .node_counts()
        .iter()
        .map(|&count| vec![false; count])
        .collect();
    for (etype, list) in index.edge_lists().iter().enumerate() {
        let (src_type, dst_type) = index.metagraph().endpoint_types(etype)?;
        for (src, dst) in list.pairs() {
            touched[src_type][src] = true;
            touched[dst_type][dst] = true;
        }
    }
    report.isolated_nodes = touched.iter().flatten().filter(|seen| !**seen).count();
    Ok(report)
}

pub fn inspect_index(index: &GraphIndex) -> Result<IndexReport, GraphIndexError> {
    let mut report = IndexReport::default();
    report.merge(&count_parallel_edges(index)?);
    report.merge(&count_self_loops(index)?);
    report.merge(&count_isolated_nodes(index)?);
    Ok(report)
}

/// Fails unless every edge type of `index` is free of parallel edges and
/// self-loops.
pub fn run_strict_checks(index: &GraphIndex) -> Result<IndexReport, IndexCheckError> {
    let report = inspect_index(index).map_err(|err| IndexCheckError {
        report: IndexReport::default(),
        source: Some(err),
    })?;
    if report.has_issues() {
        Err(IndexCheckError {
            report,
            source: None,
        })
    } else {
        Ok(report)
    }
}

fn base_report(index: &GraphIndex) -> IndexReport {
    IndexReport {
        total_nodes: index.total_nodes(),
        total_edges: index.total_edges(),
        ..IndexReport::default()
    }
}
