use std::time::Duration;

use criterion::{BenchmarkGroup, Criterion, criterion_group, criterion_main, measurement::WallTime};
use heterograph::{
    FrameSharing, HeteroGraph, NodeSelection, add_self_loop, compact_graphs, in_subgraph,
    partition_graph_with_halo, reverse, to_bidirected, to_simple,
    bench_utils::{GraphShape, generate_graph, random_partition},
};

const ER_SEED: u64 = 0xA11C;
const SF_SEED: u64 = 0xB22D;
const PART_SEED: u64 = 0xC33E;
const SAMPLE_SIZE: usize = 20;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_millis(500);

struct PreparedGraph {
    graph: HeteroGraph,
    label: &'static str,
}

fn bench_scale() -> usize {
    #[cfg(feature = "bench-ci")]
    {
        5_000
    }
    #[cfg(not(feature = "bench-ci"))]
    {
        50_000
    }
}

fn prepared_graphs() -> Vec<PreparedGraph> {
    let nodes = bench_scale();
    let random = generate_graph(
        GraphShape::RandomErdosRenyi {
            edges: nodes.saturating_mul(5),
        },
        nodes,
        ER_SEED,
    );
    let sf = generate_graph(GraphShape::ScaleFree { m: 5 }, nodes, SF_SEED);
    vec![
        PreparedGraph {
            graph: random.symmetrized().to_graph().expect("er graph"),
            label: "er",
        },
        PreparedGraph {
            graph: sf.to_graph().expect("scalefree graph"),
            label: "scalefree",
        },
    ]
}

fn configure<'a>(c: &'a mut Criterion, name: &str) -> BenchmarkGroup<'a, WallTime> {
    let mut group = c.benchmark_group(name);
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    group
}

fn bench_edge_rewrites(c: &mut Criterion) {
    let graphs = prepared_graphs();
    let mut group = configure(c, "edge_rewrites");
    for prepared in &graphs {
        group.bench_function(format!("simple/{}", prepared.label), |b| {
            b.iter(|| to_simple(&prepared.graph, Some("count"), None).expect("simple"));
        });
        group.bench_function(format!("bidirected/{}", prepared.label), |b| {
            b.iter(|| to_bidirected(&prepared.graph, true).expect("bidirected"));
        });
        group.bench_function(format!("reverse/{}", prepared.label), |b| {
            b.iter(|| reverse(&prepared.graph, FrameSharing::none()).expect("reverse"));
        });
        group.bench_function(format!("self_loop/{}", prepared.label), |b| {
            b.iter(|| add_self_loop(&prepared.graph).expect("self loop"));
        });
    }
    group.finish();
}

fn bench_extraction(c: &mut Criterion) {
    let graphs = prepared_graphs();
    let mut group = configure(c, "extraction");
    for prepared in &graphs {
        let seeds: Vec<usize> = (0..prepared.graph.total_nodes()).step_by(10).collect();
        let selection = NodeSelection::from(seeds);
        group.bench_function(format!("in_subgraph/{}", prepared.label), |b| {
            b.iter(|| in_subgraph(&prepared.graph, &selection).expect("in subgraph"));
        });
        let sampled = in_subgraph(&prepared.graph, &selection).expect("in subgraph");
        group.bench_function(format!("compact/{}", prepared.label), |b| {
            b.iter(|| compact_graphs(std::slice::from_ref(&sampled), None).expect("compact"));
        });
        let parts = random_partition(prepared.graph.total_nodes(), 4, PART_SEED).expect("partition");
        group.bench_function(format!("halo_partition/{}", prepared.label), |b| {
            b.iter(|| partition_graph_with_halo(&prepared.graph, &parts, 1).expect("partition"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_edge_rewrites, bench_extraction);
criterion_main!(benches);
