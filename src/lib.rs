//! Heterogeneous graph index and structural transforms for graph learning.
//! Run Criterion benchmarks with `cargo bench` to inspect reports under `target/criterion`.

pub mod backend;
pub mod backend_selector;
pub mod bench_utils;
pub mod bidirected;
pub mod cache;
pub mod cli;
pub mod compact;
pub mod config;
pub mod document;
pub mod errors;
pub mod frame;
pub mod graph;
pub mod index;
pub mod khop;
pub mod knn;
pub mod line_graph;
pub mod metapath;
pub mod partition;
pub mod remap;
pub mod reverse;
pub mod safety;
pub mod schema;
pub mod self_loop;
pub mod simple;
pub mod sparse;
pub mod subgraph;

pub use crate::backend::{CpuBackend, DenseMatrix, TensorBackend};
pub use crate::bidirected::to_bidirected;
pub use crate::compact::compact_graphs;
pub use crate::config::TransformConfig;
pub use crate::errors::GraphIndexError;
pub use crate::frame::{EID, FeatureColumn, Frame, FrameRef, FrameSharing, INNER_EDGE, INNER_NODE, NID};
pub use crate::graph::{HeteroGraph, NodeSelection};
pub use crate::index::{EdgeId, EdgeList, GraphIndex, IndexMode, NodeId};
pub use crate::khop::{khop_adj, khop_graph};
pub use crate::knn::{knn_graph, segmented_knn_graph};
pub use crate::line_graph::line_graph;
pub use crate::metapath::metapath_reachable_graph;
pub use crate::partition::partition_graph_with_halo;
pub use crate::reverse::reverse;
pub use crate::schema::{CanonicalEdgeType, EdgeTypeKey, Metagraph};
pub use crate::self_loop::{add_self_loop, remove_self_loop};
pub use crate::simple::{to_simple, to_simple_graph};
pub use crate::subgraph::{in_subgraph, node_subgraph, out_subgraph};
