//! End-to-end scenarios: mesh construction, splitting and tree building.
//!
//! Run with: cargo test -p bsp-mesh --test scenarios

use std::collections::HashSet;

use bsp_mesh::bsp::{BspTree, CollectingVisitor, FnVisitor};
use bsp_mesh::primitives::{SphereOptions, sphere};
use bsp_mesh::{
    BspConfig, BspError, ClassificationKind, Classifier, Mesh, Plane3D, create_bsp_tree,
};
use nalgebra::Point3;

// =============================================================================
// Helpers
// =============================================================================

fn flat(z: f32) -> [[f32; 3]; 3] {
    [[0.0, 0.0, z], [10.0, 0.0, z], [10.0, 10.0, z]]
}

/// Every triangle in the subtree rooted at `start`.
fn subtree(tree: &BspTree, start: usize) -> Vec<usize> {
    let mut result = Vec::new();
    let mut stack = vec![start];
    while let Some(triangle) = stack.pop() {
        result.push(triangle);
        if let Some(node) = tree.node(triangle) {
            stack.extend(node.children());
        }
    }
    result
}

/// Checks that every front descendant of every node has no corner behind the
/// node's plane and every back descendant none in front of it.
fn assert_half_spaces(tree: &BspTree, mesh: &Mesh) {
    let mut classifier = Classifier::new(BspConfig::default().with_vertex_epsilon(1e-4));
    for (&partition, node) in tree.nodes() {
        let plane = Plane3D::from_triangle(mesh, partition).unwrap();
        for triangle in node.front().map(|f| subtree(tree, f)).unwrap_or_default() {
            let c = classifier.classify(&plane, mesh, triangle).unwrap();
            assert!(
                c.back().is_empty(),
                "triangle {triangle} in front of {partition} has corners behind: {c:?}"
            );
        }
        for triangle in node.back().map(|b| subtree(tree, b)).unwrap_or_default() {
            let c = classifier.classify(&plane, mesh, triangle).unwrap();
            assert!(
                c.front().is_empty(),
                "triangle {triangle} behind {partition} has corners in front: {c:?}"
            );
        }
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn single_triangle() {
    let mut mesh = Mesh::new();
    mesh.add_triangle(flat(0.0)).unwrap();
    assert_eq!(mesh.num_triangles(), 1);
    assert_eq!(mesh.num_positions(), 3);

    let tree = create_bsp_tree(&mut mesh).unwrap();
    assert_eq!(tree.root(), Some(0));
    assert!(tree.node(0).unwrap().is_leaf());
    assert_eq!(mesh.num_triangles(), 1);
}

#[test]
fn straddling_triangle_is_split_into_three() {
    let mut mesh = Mesh::new();
    mesh.add_triangle(flat(0.0)).unwrap();
    mesh.add_triangle([[0.0, 0.0, -10.0], [5.0, 0.0, 3.0], [0.0, 0.0, 10.0]])
        .unwrap();

    let plane = Plane3D::from_triangle(&mesh, 0).unwrap();
    let classification = plane.classify_polygon(&mesh, 1).unwrap();
    assert_eq!(classification.kind(), ClassificationKind::SplitNoneCoplanar);

    let result = plane
        .split_polygon_none_coplanar(&mut mesh, &classification)
        .unwrap();
    assert_eq!(result.front_vertices(), vec![[6, 4, 7], [4, 5, 7]]);
    assert_eq!(result.back_vertices(), vec![[3, 6, 7]]);
    assert_eq!(mesh.num_positions(), 8);

    // Original positions are untouched.
    assert_eq!(mesh.position(3), Point3::new(0.0, 0.0, -10.0));
    assert_eq!(mesh.position(5), Point3::new(0.0, 0.0, 10.0));
}

#[test]
fn tree_build_splits_straddler() {
    let mut mesh = Mesh::from_triangles([
        flat(0.0),
        [[0.0, 0.0, -10.0], [5.0, 0.0, 3.0], [0.0, 0.0, 10.0]],
    ])
    .unwrap();
    let tree = BspTree::build(&mut mesh).unwrap();

    assert_eq!(mesh.num_positions(), 8);
    assert_eq!(mesh.num_triangles(), 5);
    assert_eq!(tree.node(0).unwrap().back(), Some(2));
    assert_eq!(tree.node(0).unwrap().front(), Some(3));
    assert!(!tree.triangles().contains(&1));
    assert_half_spaces(&tree, &mesh);
}

#[test]
fn parallel_triangles() {
    let mut mesh = Mesh::from_triangles([flat(0.0), flat(10.0), flat(-10.0)]).unwrap();
    let tree = create_bsp_tree(&mut mesh).unwrap();

    assert_eq!(tree.root(), Some(0));
    let root = tree.node(0).unwrap();
    assert_eq!(root.front(), Some(1));
    assert_eq!(root.back(), Some(2));
    assert!(tree.node(1).is_none());
    assert!(tree.node(2).is_none());
    assert_eq!(tree.stats().splits, 0);
}

#[test]
fn error_leaves_appended_geometry() {
    let mut mesh = Mesh::new();
    let err = mesh
        .add_triangle([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [f32::NAN, 0.0, 0.0]])
        .unwrap_err();
    assert!(matches!(err, BspError::DegenerateGeometry { .. }));
    assert_eq!(mesh.num_positions(), 2);
    assert_eq!(mesh.num_triangles(), 0);
}

// =============================================================================
// Sphere stress
// =============================================================================

#[test]
fn sphere_tree_is_iterative_and_consistent() {
    let mut mesh = sphere(&SphereOptions::default().with_resolution(32)).unwrap();
    let original = mesh.num_triangles();
    let tree = BspTree::build(&mut mesh).unwrap();
    let stats = *tree.stats();

    assert_eq!(stats.input_triangles, original);
    assert_eq!(mesh.num_triangles(), original + stats.created_triangles);
    assert!(tree.node_count() <= original + stats.created_triangles);

    let held = tree.triangles();
    let unique: HashSet<usize> = held.iter().copied().collect();
    assert_eq!(unique.len(), held.len(), "a triangle is held twice");
    assert_eq!(held.len(), tree.triangle_count());
    assert!(held.iter().all(|&t| t < mesh.num_triangles()));

    assert_half_spaces(&tree, &mesh);
}

#[test]
fn large_sphere_splits_like_unit_sphere() {
    // A power-of-two radius scales every coordinate exactly, so the coplanar
    // band must scale with it for the builds to match.
    let options = SphereOptions::default().with_resolution(32);
    let mut unit = sphere(&options).unwrap();
    let mut large = sphere(&options.with_radius(1024.0)).unwrap();
    assert_eq!(large.max_abs_coordinate(), 1024.0);

    let unit_tree = BspTree::build(&mut unit).unwrap();
    let large_tree = BspTree::build(&mut large).unwrap();

    assert_eq!(large_tree.stats(), unit_tree.stats());
    assert_eq!(large_tree.node_count(), unit_tree.node_count());
    assert_eq!(large.num_positions(), unit.num_positions());
    for (scaled, original) in large.positions().iter().zip(unit.positions()) {
        assert_eq!(*scaled, original * 1024.0);
    }
    assert_half_spaces(&large_tree, &large);
}

#[test]
fn sphere_split_count_does_not_grow_with_radius() {
    let options = SphereOptions::default().with_resolution(32);
    let mut unit = sphere(&options).unwrap();
    let unit_created = BspTree::build(&mut unit).unwrap().stats().created_triangles;

    for radius in [100.0, 1000.0, 10_000.0] {
        let mut mesh = sphere(&options.with_radius(radius)).unwrap();
        let tree = BspTree::build(&mut mesh).unwrap();
        let created = tree.stats().created_triangles;
        assert!(
            created <= 2 * unit_created + 64,
            "radius {radius}: {created} triangles created, unit sphere needs {unit_created}"
        );
        assert_half_spaces(&tree, &mesh);
    }
}

#[test]
fn offset_sphere_keeps_half_spaces() {
    let options = SphereOptions::default()
        .with_center(Point3::new(730.0, -415.0, 260.0))
        .with_radius(35.0)
        .with_resolution(24);
    let mut mesh = sphere(&options).unwrap();
    let original = mesh.num_triangles();
    let tree = BspTree::build(&mut mesh).unwrap();

    assert_eq!(mesh.num_triangles(), original + tree.stats().created_triangles);
    assert!(tree.stats().created_triangles < 4 * original);
    assert_half_spaces(&tree, &mesh);
}

#[test]
fn sphere_traversal_orders_agree() {
    let mut mesh = sphere(&SphereOptions::default().with_resolution(16)).unwrap();
    let tree = BspTree::build(&mut mesh).unwrap();
    let eye = Point3::new(3.0, -2.0, 5.0);

    let mut front_to_back = CollectingVisitor::new();
    tree.traverse_front_to_back(&mesh, eye, &mut front_to_back)
        .unwrap();
    let mut back_to_front = Vec::new();
    let mut visitor = FnVisitor::new(|_: &Mesh, t: usize| back_to_front.push(t));
    tree.traverse_back_to_front(&mesh, eye, &mut visitor).unwrap();

    back_to_front.reverse();
    assert_eq!(front_to_back.into_triangles(), back_to_front);
}

#[test]
fn cancelled_build_keeps_mesh_valid() {
    let mut mesh = sphere(&SphereOptions::default().with_resolution(24)).unwrap();
    let original = mesh.num_triangles();

    let err = BspTree::build_with_progress(&mut mesh, &BspConfig::default(), |p| p.processed < 10)
        .unwrap_err();
    assert!(matches!(err, BspError::Cancelled));
    assert!(mesh.num_triangles() >= original);
    assert!(
        mesh.indices()
            .iter()
            .all(|&i| i < mesh.num_positions())
    );
}

#[test]
fn welding_reduces_split_vertices() {
    let options = SphereOptions::default().with_resolution(24);

    let mut plain = sphere(&options).unwrap();
    BspTree::build(&mut plain).unwrap();

    let mut welded = sphere(&options).unwrap();
    let config = BspConfig::default().with_weld_tolerance(1e-5);
    let tree = BspTree::build_with_config(&mut welded, &config).unwrap();

    assert!(tree.stats().welded_vertices > 0);
    assert!(welded.num_positions() < plain.num_positions());
}
