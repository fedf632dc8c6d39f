use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use recycle_graph::{ObjectHeader, ObjectManager, PoolConfig, Recyclable};

#[derive(Default)]
struct Particle {
    header: ObjectHeader,
    trail: Vec<u64>,
}

impl Recyclable for Particle {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }

    fn recycle(&mut self) {
        self.trail.clear();
    }
}

fn bench_create_destroy(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_create_destroy");

    group.bench_function("object_manager_recycle", |b| {
        let manager = ObjectManager::new();
        // Warm the queue so every iteration reuses.
        let warm: Vec<_> = (0..1000)
            .map(|_| manager.create_or_recycle(Particle::default))
            .collect();
        for particle in warm {
            manager.destroy(particle).unwrap();
        }

        b.iter(|| {
            let mut live = Vec::with_capacity(1000);
            for i in 0..1000u64 {
                let mut particle = manager.create_or_recycle(Particle::default);
                particle.trail.push(i);
                live.push(particle);
            }
            for particle in live {
                manager.destroy(particle).unwrap();
            }
        });
    });

    group.bench_function("std_box_alloc_free", |b| {
        b.iter(|| {
            let mut boxes = Vec::with_capacity(1000);
            for i in 0..1000u64 {
                let mut particle = Box::<Particle>::default();
                particle.trail.push(i);
                boxes.push(particle);
            }
            black_box(boxes);
        });
    });

    group.finish();
}

fn bench_contended_recycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_contended_recycle");

    for threads in [1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            let manager = ObjectManager::with_config(PoolConfig {
                initial_capacity: 64,
                ..PoolConfig::default()
            });
            b.iter(|| {
                thread::scope(|scope| {
                    for _ in 0..threads {
                        scope.spawn(|| {
                            for _ in 0..250 {
                                let particle = manager.create_or_recycle(Particle::default);
                                manager.destroy(black_box(particle)).unwrap();
                            }
                        });
                    }
                });
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_create_destroy, bench_contended_recycle);
criterion_main!(benches);
