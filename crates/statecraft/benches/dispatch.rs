//! Dispatch throughput benchmarks.
//!
//! Run with: cargo bench --package statecraft

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use statecraft::{
    ActionKind, CombinedStates, Middleware, Payload, Registry, StateSlice, Store, StoreOptions,
};

// ============================================================================
// Helper functions to generate test data
// ============================================================================

/// A slice with `num_props` integer properties, each with inc and set.
fn generate_wide_slice(name: &str, num_props: usize) -> StateSlice {
    let mut initial = serde_json::Map::new();
    for i in 0..num_props {
        initial.insert(format!("field{}", i), json!(i));
    }
    StateSlice::new(name, Value::Object(initial))
        .unwrap()
        .create_actions((0..num_props).map(|i| (format!("field{}", i), vec![ActionKind::Inc, ActionKind::Set])))
        .unwrap()
}

fn generate_list_slice(len: usize) -> StateSlice {
    let items: Vec<Value> = (0..len).map(|i| json!({"id": i, "done": i % 2 == 0})).collect();
    StateSlice::new("list", json!({"items": items}))
        .unwrap()
        .create_actions([("items", vec![ActionKind::Filter, ActionKind::Map, ActionKind::Query])])
        .unwrap()
}

// ============================================================================
// Benchmark: reducer over slices of varying width
// ============================================================================

fn bench_reduce_wide(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce_wide_slice");

    for num_props in [10, 100, 1000] {
        group.throughput(Throughput::Elements(1));

        let slice = generate_wide_slice("wide", num_props);
        let state = slice.initial().clone();
        // Last declared condition is the slowest to match.
        let action = slice
            .action(&format!("field{}", num_props - 1), ActionKind::Inc)
            .unwrap()
            .build(json!(1));

        group.bench_with_input(BenchmarkId::from_parameter(num_props), &num_props, |b, _| {
            b.iter(|| {
                let result = slice.reduce(black_box(Some(&state)), black_box(&action));
                black_box(result)
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: action kinds over a list
// ============================================================================

fn bench_list_kinds(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_kinds");
    let slice = generate_list_slice(1000);
    let state = slice.initial().clone();

    let filter = slice
        .action("items", ActionKind::Filter)
        .unwrap()
        .build(Payload::filter(|item, _| item["done"] == json!(true)));
    group.bench_function("filter", |b| {
        b.iter(|| black_box(slice.reduce(Some(&state), black_box(&filter))))
    });

    let map = slice
        .action("items", ActionKind::Map)
        .unwrap()
        .build(Payload::map(|item, i| json!({"id": item["id"], "done": i % 3 == 0})));
    group.bench_function("map", |b| {
        b.iter(|| black_box(slice.reduce(Some(&state), black_box(&map))))
    });

    let query = slice.action("items", ActionKind::Query).unwrap().build(Payload::query(|q| {
        q.at(500)?.get("done")?.set(json!(false))?;
        Ok(())
    }));
    group.bench_function("query_nested_set", |b| {
        b.iter(|| black_box(slice.reduce(Some(&state), black_box(&query))))
    });

    group.finish();
}

// ============================================================================
// Benchmark: store dispatch with and without middlewares
// ============================================================================

fn bench_store_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_dispatch");

    for num_middlewares in [0usize, 1, 8] {
        let slice = generate_wide_slice("counter", 4);
        for _ in 0..num_middlewares {
            slice
                .add_middleware(Middleware::new("field0", ActionKind::Inc, |_, next, _| next.run()))
                .unwrap();
        }
        let states = CombinedStates::new([slice], &Registry::new()).unwrap();
        let store = Store::from_states(&states, StoreOptions::default()).unwrap();
        let handle = store.dispatch_handle();
        let inc = states.slice("counter").unwrap().action("field0", ActionKind::Inc).unwrap().clone();

        group.bench_with_input(
            BenchmarkId::new("middlewares", num_middlewares),
            &num_middlewares,
            |b, _| {
                b.iter(|| inc.call(black_box(json!(1)), &handle));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_reduce_wide, bench_list_kinds, bench_store_dispatch);

criterion_main!(benches);
