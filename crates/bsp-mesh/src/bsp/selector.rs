//! Partition selection strategies for BSP tree construction.
//!
//! The choice of partition triangle affects tree balance and the number of
//! splits during construction.

use crate::Mesh;

/// Strategy for choosing which triangle of a pending list becomes the
/// partition (and hence the splitting plane) of a subtree.
pub trait PlaneSelector {
    /// Returns the position within `candidates` of the chosen triangle.
    ///
    /// Returns `None` if the slice is empty. Out-of-range positions are
    /// treated as `0` by the builder.
    fn select(&self, mesh: &Mesh, candidates: &[usize]) -> Option<usize>;
}

/// Selects the first triangle in the list.
///
/// This is the simplest and fastest selector and makes each subtree's
/// partition its lowest-ordered triangle: original triangles in insertion
/// order, then split children in the order they were created.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstTriangle;

impl PlaneSelector for FirstTriangle {
    fn select(&self, _mesh: &Mesh, candidates: &[usize]) -> Option<usize> {
        if candidates.is_empty() { None } else { Some(0) }
    }
}
