//! # Analysis Benchmarks
//!
//! Performance benchmarks for autodeps-core graph building and sorting.
//!
//! Run with: `cargo bench -p autodeps-core`

use autodeps_core::{Dag, Model, ModelId, ReturnPath, Signature, Sorter};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Create a DAG of N vertices with edges between consecutive vertices.
fn create_linear_dag(size: usize) -> Dag {
    let mut dag = Dag::new();
    for i in 1..size {
        dag.add_edge(&format!("v{}", i - 1), &format!("v{i}"))
            .expect("edge");
    }
    dag
}

/// Create a model where every signature reads the previous one's result.
fn create_chain_model(size: usize) -> Model {
    let mut model = Model::new("chain", ModelId(1));
    for i in 0..size {
        let inputs = if i == 0 {
            Vec::new()
        } else {
            vec![format!("r{}", i - 1)]
        };
        let signature =
            Signature::new("step").with_return_path(ReturnPath::with_inputs(format!("r{i}"), inputs));
        model.insert(format!("e{i}"), signature);
    }
    model
}

/// Create a model where every signature reads the hub's result.
fn create_star_model(size: usize) -> Model {
    let mut model = Model::new("star", ModelId(1))
        .with_entry("hub", Signature::new("hub").with_return_path(ReturnPath::new("shared")));
    for i in 1..size {
        let signature = Signature::new("spoke")
            .with_return_path(ReturnPath::with_inputs(format!("r{i}"), ["shared"]));
        model.insert(format!("s{i}"), signature);
    }
    model
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_edge_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_insertion");

    for size in [100, 1000, 5000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| black_box(create_linear_dag(size)));
        });
    }

    group.finish();
}

fn bench_topological_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("topological_sort");

    for size in [100, 1000, 5000].iter() {
        let dag = create_linear_dag(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(dag.topological_sort()));
        });
    }

    group.finish();
}

fn bench_sort_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_model");

    for size in [100, 500, 1000].iter() {
        let chain = create_chain_model(*size);
        let star = create_star_model(*size);

        group.bench_with_input(BenchmarkId::new("chain", size), &chain, |b, model| {
            b.iter(|| {
                let mut model = model.clone();
                black_box(Sorter::sort(&mut model))
            });
        });

        group.bench_with_input(BenchmarkId::new("star", size), &star, |b, model| {
            b.iter(|| {
                let mut model = model.clone();
                black_box(Sorter::sort(&mut model))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_edge_insertion,
    bench_topological_sort,
    bench_sort_model
);
criterion_main!(benches);
