use criterion::{black_box, criterion_group, criterion_main, Criterion};
use threadbound_store::thread::InheritedContext;
use threadbound_store::{store, DefaultValue, Value};

fn bench_get_hit(c: &mut Criterion) {
    let target = Value::object(0u64);
    let default = DefaultValue::value(Value::int(0));
    store::set(&target, "count", Value::int(1)).unwrap();

    c.bench_function("store_get_hit", |b| {
        b.iter(|| store::get(black_box(&target), "count", &default).unwrap())
    });
}

fn bench_set(c: &mut Criterion) {
    let target = Value::object(0u64);
    let mut n = 0i64;

    c.bench_function("store_set", |b| {
        b.iter(|| {
            n += 1;
            store::set(black_box(&target), "count", Value::int(n)).unwrap()
        })
    });
}

fn bench_object_churn(c: &mut Criterion) {
    c.bench_function("store_set_fresh_object", |b| {
        b.iter(|| {
            let target = Value::object(0u64);
            store::set(&target, "count", Value::int(1)).unwrap()
        })
    });
}

fn bench_capture(c: &mut Criterion) {
    let targets: Vec<_> = (0..256).map(|i| Value::object(i as u64)).collect();
    for target in &targets {
        store::set(target, "count", Value::int(1)).unwrap();
    }

    c.bench_function("capture_256_entries", |b| {
        b.iter(|| black_box(InheritedContext::capture()))
    });
}

criterion_group!(
    benches,
    bench_get_hit,
    bench_set,
    bench_object_churn,
    bench_capture
);
criterion_main!(benches);
