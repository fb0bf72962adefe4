//! Deep clone benchmarks
//!
//! Run with: `cargo bench -p replica-clone`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use replica_clone::{clone, clone_strict};
use replica_value::{Intrinsics, Value};
use std::hint::black_box;

/// A list of `n` records, every one pointing at a shared parent
fn build_graph(intrinsics: &Intrinsics, n: usize) -> Value {
    let parent = intrinsics.new_object();
    parent.set("name", Value::string("parent"));
    let list = intrinsics.new_array(0);
    for i in 0..n {
        let obj = intrinsics.new_object();
        obj.set("id", Value::int32(i as i32));
        obj.set("parent", Value::from(parent.clone()));
        obj.set("when", Value::from(intrinsics.new_date(i as f64)));
        list.push(Value::from(obj));
    }
    parent.set("children", Value::from(list.clone()));
    Value::from(list)
}

fn clone_benchmark(c: &mut Criterion) {
    let intrinsics = Intrinsics::new();
    let mut group = c.benchmark_group("deep_clone");

    for n in [10usize, 100, 1000] {
        let graph = build_graph(&intrinsics, n);
        group.bench_with_input(BenchmarkId::new("lenient", n), &graph, |b, graph| {
            b.iter(|| black_box(clone(graph)))
        });
        group.bench_with_input(BenchmarkId::new("strict", n), &graph, |b, graph| {
            b.iter(|| black_box(clone_strict(graph)))
        });
    }

    group.finish();
}

criterion_group!(benches, clone_benchmark);
criterion_main!(benches);
