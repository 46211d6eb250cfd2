// benches/conversion.rs
//! Import/export throughput over representative payloads
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use dyn_bridge::{export, import, Dynamic, MemoryRuntime};

fn generate_record(field_count: usize) -> Dynamic {
    let mut record = Dynamic::object();

    for i in 0..field_count {
        let key = format!("field_{}", i);
        // Mix ints, floats, strings and small arrays
        match i % 4 {
            0 => record.insert(key, (i as i64) * 10),
            1 => record.insert(key, (i as f64) * 1.5),
            2 => record.insert(key, format!("value-{}", i)),
            _ => record.insert(key, vec![i as i64, (i + 1) as i64]),
        };
    }

    record
}

fn generate_batch(records: usize, fields: usize) -> Dynamic {
    Dynamic::from((0..records).map(|_| generate_record(fields)).collect::<Vec<_>>())
}

fn benchmark_import_record(c: &mut Criterion) {
    let record = generate_record(20);

    c.bench_function("import_record_20", |b| {
        b.iter_batched(
            MemoryRuntime::new,
            |mut rt| import(&mut rt, black_box(&record)),
            BatchSize::SmallInput,
        )
    });
}

fn benchmark_export_record(c: &mut Criterion) {
    let mut rt = MemoryRuntime::new();
    let value = import(&mut rt, &generate_record(20)).unwrap();

    c.bench_function("export_record_20", |b| {
        b.iter(|| export(&rt, black_box(&value)))
    });
}

fn benchmark_round_trip_by_batch_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip_batch");

    for records in [1, 10, 100, 500].iter() {
        let batch = generate_batch(*records, 20);

        group.bench_with_input(BenchmarkId::from_parameter(records), records, |b, _| {
            b.iter_batched(
                MemoryRuntime::new,
                |mut rt| {
                    let value = import(&mut rt, black_box(&batch)).unwrap();
                    export(&rt, &value).unwrap()
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn benchmark_deep_nesting(c: &mut Criterion) {
    let mut value = Dynamic::array();
    for _ in 1..256 {
        value = Dynamic::from(vec![value]);
    }

    c.bench_function("import_nested_256", |b| {
        b.iter_batched(
            MemoryRuntime::new,
            |mut rt| import(&mut rt, black_box(&value)),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    benchmark_import_record,
    benchmark_export_record,
    benchmark_round_trip_by_batch_size,
    benchmark_deep_nesting,
);

criterion_main!(benches);
