//! Benchmarks for particle-wall collision integration.
//!
//! Run with: cargo bench -p sim-core

#![allow(missing_docs, clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use sim_core::{
    CollisionBatch, CollisionCase, CollisionIntegrator, ContactLaw, ContactLawKind,
    ContactLawModel, IntegratorConfig, MaterialParameters, Particle,
};

fn material_for(kind: ContactLawKind) -> MaterialParameters {
    match kind {
        ContactLawKind::ThorntonNing => MaterialParameters::default().with_yield_press(1e5),
        _ => MaterialParameters::default(),
    }
}

fn law_for(kind: ContactLawKind) -> ContactLawModel {
    let material = material_for(kind);
    ContactLawModel::new(kind, material, Particle::from_density(0.02, material.density)).unwrap()
}

/// One full collision per law with default settings.
fn bench_single_collision(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_collision");
    let integrator = CollisionIntegrator::default();

    for kind in ContactLawKind::ALL {
        let mut law = law_for(kind);
        group.bench_function(BenchmarkId::from_parameter(kind.name()), |b| {
            b.iter(|| black_box(integrator.run(&mut law).unwrap()));
        });
    }

    group.finish();
}

/// Force evaluation alone, the inner loop of every step.
fn bench_normal_force(c: &mut Criterion) {
    let mut group = c.benchmark_group("normal_force");

    for kind in ContactLawKind::ALL {
        let law = law_for(kind);
        group.bench_function(BenchmarkId::from_parameter(kind.name()), |b| {
            b.iter(|| black_box(law.normal_force(black_box(1e-4), black_box(0.05))));
        });
    }

    // Adhesive radius goes through the cubic solve
    let sticky = MaterialParameters::default().with_cohesion(0.05);
    let law = ContactLawModel::new(
        ContactLawKind::HertzMindlin,
        sticky,
        Particle::from_density(0.02, sticky.density),
    )
    .unwrap();
    group.bench_function("Hertz-Mindlin/cohesive", |b| {
        b.iter(|| black_box(law.normal_force(black_box(1e-4), black_box(0.05))));
    });

    group.finish();
}

/// Cost of tighter tolerances.
fn bench_tolerances(c: &mut Criterion) {
    let mut group = c.benchmark_group("tolerances");
    let configs = [
        ("fast", IntegratorConfig::fast()),
        ("default", IntegratorConfig::default()),
        ("high_accuracy", IntegratorConfig::high_accuracy()),
    ];

    for (name, config) in configs {
        let integrator = CollisionIntegrator::new(config).unwrap();
        let mut law = law_for(ContactLawKind::HertzMindlin);
        group.bench_function(name, |b| {
            b.iter(|| black_box(integrator.run(&mut law).unwrap()));
        });
    }

    group.finish();
}

/// Parameter sweep over particle radius, parallel when `parallel` is on.
fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    group.sample_size(20);
    let integrator = CollisionIntegrator::default();

    for n in [16_usize, 128] {
        let batch: CollisionBatch = (0..n)
            .map(|i| {
                let material = material_for(ContactLawKind::ThorntonNing);
                let radius = 0.005 + 0.0005 * i as f64;
                CollisionCase::new(
                    ContactLawKind::ThorntonNing,
                    material,
                    Particle::from_density(radius, material.density),
                )
            })
            .collect();

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("thornton_ning", n), &batch, |b, batch| {
            b.iter(|| black_box(batch.run(&integrator)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_collision,
    bench_normal_force,
    bench_tolerances,
    bench_batch,
);
criterion_main!(benches);
