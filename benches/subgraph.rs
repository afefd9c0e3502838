//! Benchmarks for graph building, subgraph extraction and DOT export
//!
//! Uses synthetic layered addons graphs in the size range of large
//! installations (a few thousand modules).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use addon_graph::export::{DotExporter, Exporter};
use addon_graph::graph::ModuleGraph;
use addon_graph::parser::Manifest;

/// Create layered manifests: every module depends on up to `fan_out`
/// modules of the previous layer, and layer 0 depends on `base`.
fn create_manifests(total_modules: usize, fan_out: usize) -> Vec<Manifest> {
    let layer_size = 50;
    let mut manifests = vec![Manifest::new("base", Vec::<&str>::new())];

    for i in 0..total_modules {
        let layer = i / layer_size;
        let depends: Vec<String> = if layer == 0 {
            vec!["base".to_string()]
        } else {
            (0..fan_out)
                .map(|k| {
                    let target = (layer - 1) * layer_size + (i + k * 7) % layer_size;
                    format!("mod_{}", target)
                })
                .collect()
        };
        manifests.push(Manifest::new(format!("mod_{}", i), depends));
    }

    manifests
}

/// Benchmark folding manifests into a graph
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");

    for size in [500, 1000, 5000].iter() {
        let manifests = create_manifests(*size, 4);

        group.bench_with_input(BenchmarkId::new("modules", size), &manifests, |b, m| {
            b.iter(|| black_box(ModuleGraph::from_manifests(m.iter().cloned())));
        });
    }

    group.finish();
}

/// Benchmark both subgraph extractions from the base module
fn bench_subgraphs(c: &mut Criterion) {
    let mut group = c.benchmark_group("subgraph_extract");

    for size in [500, 1000, 5000].iter() {
        let graph = ModuleGraph::from_manifests(create_manifests(*size, 4));

        group.bench_with_input(BenchmarkId::new("dependents", size), &graph, |b, g| {
            b.iter(|| black_box(g.dependents_subgraph("base")));
        });

        // The last module reaches every layer below it
        let leaf = format!("mod_{}", size - 1);
        group.bench_with_input(BenchmarkId::new("dependencies", size), &graph, |b, g| {
            b.iter(|| black_box(g.dependencies_subgraph(&leaf)));
        });
    }

    group.finish();
}

/// Benchmark DOT export of the full graph
fn bench_dot_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("dot_export");

    for size in [500, 1000, 5000].iter() {
        let graph = ModuleGraph::from_manifests(create_manifests(*size, 4));
        let exporter = DotExporter::new();

        group.bench_with_input(BenchmarkId::new("modules", size), &graph, |b, g| {
            b.iter(|| {
                let mut out = Vec::with_capacity(g.node_count() * 96);
                exporter.export(g, &mut out).unwrap();
                black_box(out)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_subgraphs, bench_dot_export);
criterion_main!(benches);
