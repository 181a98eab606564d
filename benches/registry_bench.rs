//! Performance benchmarks for the controller registries.
//!
//! These benchmarks measure hot-plug bookkeeping (slot and uid registries)
//! and listener fan-out on the notification bus.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench registry_bench
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use hotpad_core::{ControllerEvent, ControllerUid};
use hotpad_hardware::DeviceHandle;
use hotpad_registry::{KeyedRegistry, NotificationBus, SlotRegistry};
use std::hint::black_box;
use std::sync::Arc;

/// Create `count` distinct device handles.
fn create_devices(count: usize) -> Vec<DeviceHandle<usize>> {
    (0..count).map(|n| DeviceHandle::new(Arc::new(n))).collect()
}

/// Create `count` distinct controller uids.
fn create_uids(count: usize) -> Vec<ControllerUid> {
    (0..count)
        .map(|n| ControllerUid::new(format!("HID\\VID_045E&PID_0B13\\{n:08}")).unwrap())
        .collect()
}

/// Benchmark filling a slot registry and emptying it again.
fn bench_slot_add_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_add_remove");

    for count in [4, 16, 64].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        let devices = create_devices(*count);

        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| {
                let registry = SlotRegistry::new();
                for device in &devices {
                    black_box(registry.add(device.clone()));
                }
                for device in &devices {
                    black_box(registry.remove(device));
                }
                black_box(registry.count());
            });
        });
    }

    group.finish();
}

/// Benchmark refilling tombstoned slots.
fn bench_slot_reuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_reuse");
    group.throughput(Throughput::Elements(1));

    let devices = create_devices(16);
    let registry = SlotRegistry::new();
    for device in &devices {
        registry.add(device.clone());
    }
    let visitor = DeviceHandle::new(Arc::new(usize::MAX));

    group.bench_function("remove_then_add_middle_slot", |b| {
        b.iter(|| {
            registry.remove(&devices[8]);
            black_box(registry.add(visitor.clone()));
            registry.remove(&visitor);
            black_box(registry.add(devices[8].clone()));
        });
    });

    group.finish();
}

/// Benchmark slot lookups.
fn bench_slot_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_get");
    group.throughput(Throughput::Elements(1));

    let registry = SlotRegistry::new();
    for device in create_devices(16) {
        registry.add(device);
    }

    group.bench_function("get_occupied", |b| {
        b.iter(|| black_box(registry.get(black_box(7))));
    });

    group.bench_function("get_out_of_range", |b| {
        b.iter(|| black_box(registry.get(black_box(1000))));
    });

    group.finish();
}

/// Benchmark keyed registry upserts, lookups and listings.
fn bench_keyed(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyed");

    let uids = create_uids(64);
    let devices = create_devices(64);

    group.throughput(Throughput::Elements(uids.len() as u64));
    group.bench_function("upsert_64", |b| {
        b.iter(|| {
            let registry = KeyedRegistry::new();
            for (uid, device) in uids.iter().zip(&devices) {
                black_box(registry.upsert(uid.clone(), device.clone()));
            }
        });
    });

    let registry = KeyedRegistry::new();
    for (uid, device) in uids.iter().zip(&devices) {
        registry.upsert(uid.clone(), device.clone());
    }

    group.throughput(Throughput::Elements(1));
    group.bench_function("find", |b| {
        let key = uids[42].as_str();
        b.iter(|| black_box(registry.find(black_box(key))));
    });

    for capacity in [0, 8, 64].iter() {
        group.bench_with_input(BenchmarkId::new("list", capacity), capacity, |b, &capacity| {
            b.iter(|| black_box(registry.list(capacity)));
        });
    }

    group.finish();
}

/// Benchmark event fan-out to a growing number of listeners.
fn bench_bus_fire(c: &mut Criterion) {
    let mut group = c.benchmark_group("bus_fire");
    let event = ControllerEvent::gamepad_added(3);

    for listeners in [1, 8, 64].iter() {
        group.throughput(Throughput::Elements(*listeners as u64));

        let bus = NotificationBus::new();
        for _ in 0..*listeners {
            bus.register(|event| {
                black_box(event);
            });
        }

        group.bench_with_input(BenchmarkId::from_parameter(listeners), listeners, |b, _| {
            b.iter(|| bus.fire(black_box(&event)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_slot_add_remove,
    bench_slot_reuse,
    bench_slot_get,
    bench_keyed,
    bench_bus_fire
);
criterion_main!(benches);
