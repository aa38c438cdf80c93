//! Benchmarks for BSP tree construction and classification.
//!
//! Run with: cargo bench -p bsp-mesh
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p bsp-mesh -- --save-baseline main
//! 2. After changes: cargo bench -p bsp-mesh -- --baseline main

#![allow(missing_docs, clippy::cast_possible_truncation)]

use bsp_mesh::bsp::FnVisitor;
use bsp_mesh::primitives::{SphereOptions, sphere};
use bsp_mesh::{BspConfig, BspTree, Classifier, Mesh, Plane3D};
use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use nalgebra::Point3;

// =============================================================================
// Test Mesh Generation
// =============================================================================

fn create_sphere(resolution: usize) -> Mesh {
    sphere(&SphereOptions::default().with_resolution(resolution)).unwrap_or_default()
}

// =============================================================================
// Tree Construction
// =============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for resolution in [16, 32, 64] {
        let mesh = create_sphere(resolution);
        group.throughput(Throughput::Elements(mesh.num_triangles() as u64));

        group.bench_with_input(
            BenchmarkId::new("sphere", mesh.num_triangles()),
            &mesh,
            |b, mesh| {
                b.iter_batched(
                    || mesh.clone(),
                    |mut mesh| BspTree::build(black_box(&mut mesh)),
                    BatchSize::SmallInput,
                );
            },
        );
    }

    let mesh = create_sphere(32);
    let config = BspConfig::default().with_weld_tolerance(1e-5);
    group.bench_function("sphere_welded", |b| {
        b.iter_batched(
            || mesh.clone(),
            |mut mesh| BspTree::build_with_config(black_box(&mut mesh), &config),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

// =============================================================================
// Classification
// =============================================================================

fn bench_classify(c: &mut Criterion) {
    let mesh = create_sphere(64);
    let Ok(plane) = Plane3D::from_triangle(&mesh, 0) else {
        return;
    };

    let mut group = c.benchmark_group("classify");
    group.throughput(Throughput::Elements(mesh.num_triangles() as u64));

    group.bench_function("cached_spheres", |b| {
        let mut classifier = Classifier::default();
        b.iter(|| {
            for t in 0..mesh.num_triangles() {
                let _ = black_box(classifier.classify(&plane, &mesh, t));
            }
        });
    });

    group.bench_function("one_shot", |b| {
        b.iter(|| {
            for t in 0..mesh.num_triangles() {
                let _ = black_box(plane.classify_polygon(&mesh, t));
            }
        });
    });

    group.finish();
}

// =============================================================================
// Traversal
// =============================================================================

fn bench_traverse(c: &mut Criterion) {
    let mut mesh = create_sphere(32);
    let Ok(tree) = BspTree::build(&mut mesh) else {
        return;
    };
    let eye = Point3::new(3.0, 2.0, 1.0);

    c.bench_function("traverse_back_to_front", |b| {
        b.iter(|| {
            let mut count = 0usize;
            let mut visitor = FnVisitor::new(|_: &Mesh, _: usize| count += 1);
            let _ = tree.traverse_back_to_front(&mesh, black_box(eye), &mut visitor);
            count
        });
    });
}

// =============================================================================
// Criterion Setup
// =============================================================================

criterion_group!(benches, bench_build, bench_classify, bench_traverse);
criterion_main!(benches);
