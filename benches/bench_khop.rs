use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use heterograph::{
    CpuBackend, khop_adj, khop_graph, knn_graph,
    bench_utils::{GraphShape, generate_graph, generate_points},
};

const GRID_SEED: u64 = 0xD44F;
const POINT_SEED: u64 = 0xE550;
const SAMPLE_SIZE: usize = 10;
const WARM_UP: Duration = Duration::from_millis(300);
const MEASURE: Duration = Duration::from_millis(500);

fn bench_scale() -> usize {
    #[cfg(feature = "bench-ci")]
    {
        16
    }
    #[cfg(not(feature = "bench-ci"))]
    {
        32
    }
}

fn bench_khop(c: &mut Criterion) {
    let side = bench_scale();
    let dataset = generate_graph(
        GraphShape::Grid2D {
            width: side,
            height: side,
        },
        side * side,
        GRID_SEED,
    );
    let graph = dataset.symmetrized().to_graph().expect("grid graph");
    let mut group = c.benchmark_group("khop");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for k in [1u32, 2, 3] {
        group.bench_with_input(BenchmarkId::new("graph", k), &k, |b, &k| {
            b.iter(|| khop_graph(&graph, k).expect("khop graph"));
        });
        group.bench_with_input(BenchmarkId::new("adj_cpu", k), &k, |b, &k| {
            b.iter(|| khop_adj(&CpuBackend, &graph, k).expect("khop adj"));
        });
        #[cfg(feature = "ndarray-backend")]
        group.bench_with_input(BenchmarkId::new("adj_ndarray", k), &k, |b, &k| {
            b.iter(|| {
                khop_adj(&heterograph::backend::NdarrayBackend, &graph, k).expect("khop adj")
            });
        });
    }
    group.finish();
}

fn bench_knn(c: &mut Criterion) {
    let points = generate_points(bench_scale() * 16, 3, POINT_SEED).expect("points");
    let mut group = c.benchmark_group("knn");
    group.sample_size(SAMPLE_SIZE);
    group.warm_up_time(WARM_UP);
    group.measurement_time(MEASURE);
    for k in [4usize, 8] {
        group.bench_with_input(BenchmarkId::new("cpu", k), &k, |b, &k| {
            b.iter(|| knn_graph(&CpuBackend, std::slice::from_ref(&points), k).expect("knn"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_khop, bench_knn);
criterion_main!(benches);
