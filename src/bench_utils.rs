use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    backend::DenseMatrix,
    errors::GraphIndexError,
    graph::HeteroGraph,
    index::{GraphIndex, IndexMode, NodeId},
};

#[derive(Clone, Debug)]
pub struct GraphDataset {
    pub num_nodes: usize,
    pub pairs: Vec<(NodeId, NodeId)>,
}

impl GraphDataset {
    pub fn nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn edges(&self) -> usize {
        self.pairs.len()
    }

    pub fn degrees(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.num_nodes];
        for &(src, dst) in &self.pairs {
            counts[src] += 1;
            counts[dst] += 1;
        }
        counts
    }

    pub fn hub_index(&self) -> usize {
        let mut best = (0usize, 0usize);
        for (idx, deg) in self.degrees().into_iter().enumerate() {
            if deg > best.0 {
                best = (deg, idx);
            }
        }
        best.1
    }

    pub fn to_index(&self, mode: IndexMode) -> Result<GraphIndex, GraphIndexError> {
        GraphIndex::from_pairs(self.num_nodes, &self.pairs, mode)
    }

    pub fn to_graph(&self) -> Result<HeteroGraph, GraphIndexError> {
        HeteroGraph::homogeneous(self.num_nodes, &self.pairs)
    }

    /// Same dataset with every edge followed by its reverse.
    pub fn symmetrized(&self) -> GraphDataset {
        let mut pairs = Vec::with_capacity(self.pairs.len() * 2);
        for &(src, dst) in &self.pairs {
            pairs.push((src, dst));
            pairs.push((dst, src));
        }
        GraphDataset {
            num_nodes: self.num_nodes,
            pairs,
        }
    }
}

#[derive(Clone, Debug)]
pub enum GraphShape {
    Line,
    Star,
    Grid2D { width: usize, height: usize },
    RandomErdosRenyi { edges: usize },
    ScaleFree { m: usize },
}

pub fn generate_graph(shape: GraphShape, node_count: usize, seed: u64) -> GraphDataset {
    assert!(node_count > 1, "node_count must exceed 1");
    let mut pairs = match shape {
        GraphShape::Line => generate_line_edges(node_count),
        GraphShape::Star => generate_star_edges(node_count),
        GraphShape::Grid2D { width, height } => generate_grid_edges(width, height, node_count),
        GraphShape::RandomErdosRenyi { edges } => generate_random_edges(node_count, edges, seed),
        GraphShape::ScaleFree { m } => generate_scale_free_edges(node_count, m, seed),
    };
    pairs.sort_unstable();
    GraphDataset {
        num_nodes: node_count,
        pairs,
    }
}

/// Uniform points in the unit cube, one per row.
pub fn generate_points(
    count: usize,
    dims: usize,
    seed: u64,
) -> Result<DenseMatrix, GraphIndexError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(count * dims);
    for _ in 0..count * dims {
        data.push(rng.r#gen::<f32>());
    }
    DenseMatrix::new(count, dims, data)
}

/// Random partition id in `0..parts` for every node.
pub fn random_partition(
    node_count: usize,
    parts: usize,
    seed: u64,
) -> Result<Vec<usize>, GraphIndexError> {
    if parts == 0 {
        return Err(GraphIndexError::invalid_argument("parts must be positive"));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..node_count).map(|_| rng.gen_range(0..parts)).collect())
}

fn generate_line_edges(count: usize) -> Vec<(NodeId, NodeId)> {
    (0..count - 1).map(|idx| (idx, idx + 1)).collect()
}

fn generate_star_edges(count: usize) -> Vec<(NodeId, NodeId)> {
    (1..count).map(|leaf| (0, leaf)).collect()
}

fn generate_grid_edges(width: usize, height: usize, node_count: usize) -> Vec<(NodeId, NodeId)> {
    assert_eq!(
        width * height,
        node_count,
        "grid dimensions must match node count"
    );
    let mut edges = Vec::with_capacity(width * height * 2);
    for y in 0..height {
        for x in 0..width {
            let base = grid_index(x, y, width);
            if x + 1 < width {
                edges.push((base, grid_index(x + 1, y, width)));
            }
            if y + 1 < height {
                edges.push((base, grid_index(x, y + 1, width)));
            }
        }
    }
    edges
}

fn generate_random_edges(node_count: usize, edge_count: usize, seed: u64) -> Vec<(NodeId, NodeId)> {
    let total_pairs = pair_count(node_count);
    assert!(
        edge_count as u128 <= total_pairs,
        "edge_count exceeds possible pairs"
    );
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = Vec::with_capacity(edge_count);
    let mut idx = 0u64;
    let mut remaining_edges = edge_count as u64;
    while remaining_edges > 0 && idx < total_pairs as u64 {
        let remaining_pairs = total_pairs as u64 - idx;
        let p = remaining_edges as f64 / remaining_pairs as f64;
        let skip = sample_geometric(&mut rng, p);
        idx += skip;
        if idx >= total_pairs as u64 {
            break;
        }
        let (from, to) = pair_from_index(idx, node_count as u64);
        edges.push((from as usize, to as usize));
        idx += 1;
        remaining_edges -= 1;
    }
    edges
}

fn generate_scale_free_edges(node_count: usize, m: usize, seed: u64) -> Vec<(NodeId, NodeId)> {
    assert!(m > 0, "m must be positive");
    assert!(node_count > m + 1, "node_count must exceed m + 1");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut degrees = vec![0usize; node_count];
    let mut edges = Vec::new();
    let seed_nodes = m + 1;
    for u in 0..seed_nodes {
        for v in (u + 1)..seed_nodes {
            edges.push((u, v));
            degrees[u] += 1;
            degrees[v] += 1;
        }
    }
    let mut total_degree: usize = degrees.iter().sum();
    for new_node in seed_nodes..node_count {
        let mut targets = Vec::new();
        while targets.len() < m {
            let pick = rng.gen_range(0..total_degree);
            let mut cumulative = 0usize;
            for candidate in 0..new_node {
                cumulative += degrees[candidate];
                if pick < cumulative {
                    if !targets.contains(&candidate) {
                        targets.push(candidate);
                    }
                    break;
                }
            }
        }
        targets.sort_unstable();
        for target in targets {
            edges.push((target, new_node));
            degrees[target] += 1;
            degrees[new_node] += 1;
            total_degree += 2;
        }
    }
    edges
}

fn grid_index(x: usize, y: usize, width: usize) -> usize {
    y * width + x
}

fn pair_count(nodes: usize) -> u128 {
    let n = nodes as u128;
    n * (n - 1) / 2
}

fn sample_geometric(rng: &mut StdRng, p: f64) -> u64 {
    let u = rng.r#gen::<f64>().max(f64::MIN_POSITIVE);
    ((u.ln() / (1.0 - p).ln()).floor().max(0.0)) as u64
}

fn pair_from_index(idx: u64, nodes: u64) -> (u64, u64) {
    let mut left = 0;
    let mut start = 0u64;
    while left < nodes - 1 {
        let remaining = nodes - left - 1;
        if idx < start + remaining {
            return (left, left + 1 + (idx - start));
        }
        start += remaining;
        left += 1;
    }
    (nodes - 2, nodes - 1)
}
