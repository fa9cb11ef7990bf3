//! Comparator and executor benchmarks.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use wasmfract_core::datatype::{F64, FOUR_F64_IN_TWO_F64_OUT};
use wasmfract_core::{
    ClosureExports, FixtureCatalog, Formatter, FunctionTestDescriptor, TestRunner, TestVector,
    Value, compare,
};

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");

    for &len in &[2usize, 16, 256] {
        let types = vec![F64; len];
        let expected: Vec<Value> = (0..len).map(|i| Value::Number(i as f64 * 0.5)).collect();
        let exact = expected.clone();
        let nudged: Vec<Value> = (0..len)
            .map(|i| Value::Number(i as f64 * 0.5 + F64.tolerance() / 2.0))
            .collect();

        group.bench_with_input(BenchmarkId::new("exact", len), &len, |b, _| {
            b.iter(|| criterion::black_box(compare(&types, &exact, &expected).verdict()));
        });
        group.bench_with_input(BenchmarkId::new("tolerance", len), &len, |b, _| {
            b.iter(|| criterion::black_box(compare(&types, &nudged, &expected).verdict()));
        });
    }
    group.finish();
}

fn bench_hex_formatter(c: &mut Criterion) {
    let words: Vec<f64> = (0..1024_i32)
        .map(|i| f64::from(i.wrapping_mul(0x0101_0101)))
        .collect();
    c.bench_function("hex_format_1024", |b| {
        b.iter(|| criterion::black_box(Formatter::Hex.apply_all(&words)));
    });
}

fn bench_runner(c: &mut Criterion) {
    let vectors = (0..100)
        .map(|i| {
            let x = f64::from(i);
            TestVector::new(&[x, 1.0, 2.0, x], &[x + 2.0, x + 1.0])
        })
        .collect();
    let catalog = FixtureCatalog::new().with(
        FunctionTestDescriptor::new("add", FOUR_F64_IN_TWO_F64_OUT, "Add").with_vectors(vectors),
    );

    c.bench_function("runner_100_vectors", |b| {
        b.iter(|| {
            let mut module =
                ClosureExports::new().with("add", |a| Ok(vec![a[0] + a[2], a[1] + a[3]]));
            criterion::black_box(TestRunner::new("bench", "complex").run(&mut module, &catalog))
        });
    });
}

criterion_group!(benches, bench_compare, bench_hex_formatter, bench_runner);
criterion_main!(benches);
