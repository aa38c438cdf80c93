//! Callbacks invoked by [`BspTree`](super::BspTree) traversal.
//!
//! Traversal hands out triangle indices together with the mesh they index
//! into. A visitor decides what to read from the mesh: the index alone, the
//! position indices, or the corner points.

use nalgebra::Point3;

use crate::Mesh;

/// Receives triangles in traversal order.
///
/// `triangle` indexes into `mesh`, which is the same mesh the tree was built
/// over, including every triangle appended by splitting.
pub trait BspVisitor {
    /// Called once per triangle stored in the tree.
    fn visit(&mut self, mesh: &Mesh, triangle: usize);
}

/// Records triangle indices in the order they were visited.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    collected: Vec<usize>,
}

impl CollectingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the visitor, returning the visit order.
    pub fn into_triangles(self) -> Vec<usize> {
        self.collected
    }

    pub fn triangles(&self) -> &[usize] {
        &self.collected
    }
}

impl BspVisitor for CollectingVisitor {
    fn visit(&mut self, _mesh: &Mesh, triangle: usize) {
        self.collected.push(triangle);
    }
}

/// Copies the corner points of every visited triangle, in winding order.
///
/// A back-to-front traversal into this visitor yields a painter's-order
/// triangle soup that no longer borrows the mesh.
#[derive(Debug, Default)]
pub struct TrianglePointsVisitor {
    triangles: Vec<[Point3<f32>; 3]>,
}

impl TrianglePointsVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles copied so far.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn points(&self) -> &[[Point3<f32>; 3]] {
        &self.triangles
    }

    pub fn into_points(self) -> Vec<[Point3<f32>; 3]> {
        self.triangles
    }
}

impl BspVisitor for TrianglePointsVisitor {
    fn visit(&mut self, mesh: &Mesh, triangle: usize) {
        self.triangles.push(mesh.triangle_points(triangle));
    }
}

/// Adapts a closure `FnMut(&Mesh, usize)` into a visitor.
pub struct FnVisitor<F>
where
    F: FnMut(&Mesh, usize),
{
    func: F,
}

impl<F> FnVisitor<F>
where
    F: FnMut(&Mesh, usize),
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> BspVisitor for FnVisitor<F>
where
    F: FnMut(&Mesh, usize),
{
    fn visit(&mut self, mesh: &Mesh, triangle: usize) {
        (self.func)(mesh, triangle);
    }
}
