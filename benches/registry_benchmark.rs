use std::hint::black_box;

use call_memo::{MokaStore, UnitId, UnitRegistry};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};

fn bench_register(c: &mut Criterion) {
	let mut group = c.benchmark_group("register");
	group.throughput(Throughput::Elements(100));
	group.bench_function("explicit", |b| {
		b.iter(|| {
			let registry = UnitRegistry::new();
			for i in 0..100u32 {
				let id = UnitId::new("bench", format!("unit_{i}"), "");
				registry
					.register(black_box(id), MokaStore::<u64, u64>::new(format!("store_{i}")))
					.unwrap();
			}
		});
	});
	group.finish();
}

fn bench_explicit_store_get(c: &mut Criterion) {
	let registry = UnitRegistry::new();
	let id = UnitId::new("bench", "explicit_unit", "");
	registry
		.register(id.clone(), MokaStore::<u64, u64>::new("explicit"))
		.unwrap();
	for i in 0..1000u64 {
		registry.store_result(&id, i, i * 2).unwrap();
	}

	c.bench_function("get_explicit", |b| {
		b.iter(|| {
			for i in 0..1000u64 {
				let _ = registry.get_result::<u64, u64>(&id, &black_box(i)).unwrap();
			}
		});
	});
}

#[inline(never)]
fn resolved_get(registry: &UnitRegistry, key: u64) -> Option<u64> {
	registry.get_caller_result::<u64, u64>(&key).unwrap()
}

/// Quantifies the per-call symbolization cost of the caller-resolved path
/// against the explicit-identifier fast path above.
fn bench_resolved_get(c: &mut Criterion) {
	let registry = UnitRegistry::new();
	let id = UnitId::new("registry_benchmark", "resolved_get", "fn(u64) -> Option<u64>");
	registry
		.register(id.clone(), MokaStore::<u64, u64>::new("resolved"))
		.unwrap();
	for i in 0..100u64 {
		registry.store_result(&id, i, i * 2).unwrap();
	}

	c.bench_function("get_caller_resolved", |b| {
		b.iter(|| {
			let _ = resolved_get(&registry, black_box(7));
		});
	});
}

criterion_group!(
	benches,
	bench_register,
	bench_explicit_store_get,
	bench_resolved_get
);
criterion_main!(benches);
