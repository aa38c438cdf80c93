//! Growable indexed triangle storage.

use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::Point3;

use crate::{BspError, BspResult};

/// Number of triangles a [`Mesh::new`] reserves room for.
pub const DEFAULT_RESERVED_TRIANGLES: usize = 1000;

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a [`Mesh`] instance.
///
/// Caches derived from a mesh record the id they were filled from so they are
/// never reused against another mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(u64);

impl MeshId {
    fn next() -> Self {
        Self(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An append-only indexed triangle mesh.
///
/// Positions are stored flat as `[x0, y0, z0, x1, y1, z1, ...]` in insertion
/// order and are never deduplicated. Indices are stored flat in triples, one
/// triple per triangle, each entry referring to a position.
///
/// Both buffers double their capacity whenever the next write would overflow
/// them, so `n` insertions cost `O(n)` copies in total. Nothing is ever
/// removed or reordered: a position index or triangle index, once returned,
/// keeps referring to the same data for the lifetime of the mesh.
#[derive(Debug)]
pub struct Mesh {
    id: MeshId,
    positions: Vec<f32>,
    indices: Vec<u32>,
    max_abs_coordinate: f32,
}

impl Mesh {
    /// Creates an empty mesh with room for [`DEFAULT_RESERVED_TRIANGLES`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RESERVED_TRIANGLES)
    }

    /// Creates an empty mesh with room for `reserved_triangles` triangles
    /// (nine position floats and three indices per triangle).
    pub fn with_capacity(reserved_triangles: usize) -> Self {
        Self {
            id: MeshId::next(),
            positions: Vec::with_capacity(reserved_triangles * 9),
            indices: Vec::with_capacity(reserved_triangles * 3),
            max_abs_coordinate: 0.0,
        }
    }

    /// Builds a mesh from a list of triangles given by their corner points.
    pub fn from_triangles(triangles: impl IntoIterator<Item = [[f32; 3]; 3]>) -> BspResult<Self> {
        let mut mesh = Self::new();
        for triangle in triangles {
            mesh.add_triangle(triangle)?;
        }
        Ok(mesh)
    }

    /// Returns this mesh's identity.
    #[inline]
    pub fn id(&self) -> MeshId {
        self.id
    }

    /// Number of positions stored.
    #[inline]
    pub fn num_positions(&self) -> u32 {
        (self.positions.len() / 3) as u32
    }

    /// Number of triangles stored.
    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns `true` if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The flat position buffer.
    #[inline]
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// The flat index buffer.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of positions the buffer can hold before it grows.
    #[inline]
    pub fn position_capacity(&self) -> usize {
        self.positions.capacity() / 3
    }

    /// Number of triangles the index buffer can hold before it grows.
    #[inline]
    pub fn triangle_capacity(&self) -> usize {
        self.indices.capacity() / 3
    }

    /// Largest absolute value of any stored coordinate.
    ///
    /// Rounding a point to `f32` moves it by up to half an ulp of this
    /// magnitude, which bounds how far a stored split vertex can drift off
    /// its cutting plane.
    #[inline]
    pub fn max_abs_coordinate(&self) -> f32 {
        self.max_abs_coordinate
    }

    /// Returns the position stored at `index`.
    ///
    /// # Panics
    /// Panics if `index >= num_positions()`.
    #[inline]
    pub fn position(&self, index: u32) -> Point3<f32> {
        let i = index as usize * 3;
        Point3::new(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    /// Returns the position indices of triangle `triangle`, in winding order.
    /// [`try_triangle`](Self::try_triangle) is the checked variant.
    ///
    /// # Panics
    /// Panics if `triangle >= num_triangles()`.
    #[inline]
    pub fn triangle(&self, triangle: usize) -> [u32; 3] {
        let i = triangle * 3;
        [self.indices[i], self.indices[i + 1], self.indices[i + 2]]
    }

    /// Returns the position indices of triangle `triangle`, or
    /// [`BspError::TriangleOutOfBounds`] if there is no such triangle.
    pub fn try_triangle(&self, triangle: usize) -> BspResult<[u32; 3]> {
        if triangle >= self.num_triangles() {
            return Err(BspError::TriangleOutOfBounds {
                triangle,
                num_triangles: self.num_triangles(),
            });
        }
        Ok(self.triangle(triangle))
    }

    /// Returns the corner points of triangle `triangle`, in winding order.
    ///
    /// # Panics
    /// Panics if `triangle >= num_triangles()`.
    pub fn triangle_points(&self, triangle: usize) -> [Point3<f32>; 3] {
        self.triangle(triangle).map(|index| self.position(index))
    }

    /// Appends a position and returns its index.
    ///
    /// The returned index always equals the previous `num_positions()`.
    /// Fails with [`BspError::DegenerateGeometry`] if any coordinate is NaN or
    /// infinite, in which case the mesh is left unchanged.
    pub fn add_position(&mut self, point: [f32; 3]) -> BspResult<u32> {
        if !point.iter().all(|c| c.is_finite()) {
            return Err(BspError::degenerate(format!(
                "non-finite position ({}, {}, {})",
                point[0], point[1], point[2]
            )));
        }

        let index = self.num_positions();
        self.reserve_position();
        self.positions.extend_from_slice(&point);
        self.max_abs_coordinate = point
            .iter()
            .fold(self.max_abs_coordinate, |max, c| max.max(c.abs()));
        Ok(index)
    }

    /// Appends a triangle from three corner points and returns its index.
    ///
    /// The points are appended as new positions in the given order, which
    /// defines the winding and hence the normal direction. If a later point
    /// is rejected, the earlier ones stay in the position buffer.
    pub fn add_triangle(&mut self, points: [[f32; 3]; 3]) -> BspResult<usize> {
        let [a, b, c] = points;
        let ia = self.add_position(a)?;
        let ib = self.add_position(b)?;
        let ic = self.add_position(c)?;
        self.push_triangle([ia, ib, ic]);
        Ok(self.num_triangles() - 1)
    }

    /// Appends a triangle built from existing positions and returns its index.
    ///
    /// Fails with [`BspError::IndexOutOfBounds`] if any index does not refer
    /// to a stored position.
    pub fn add_triangle_using_indices(&mut self, indices: [u32; 3]) -> BspResult<usize> {
        let num_positions = self.num_positions();
        if let Some(&index) = indices.iter().find(|&&i| i >= num_positions) {
            return Err(BspError::IndexOutOfBounds {
                index,
                num_positions,
            });
        }
        self.push_triangle(indices);
        Ok(self.num_triangles() - 1)
    }

    fn push_triangle(&mut self, indices: [u32; 3]) {
        self.reserve_triangle();
        self.indices.extend_from_slice(&indices);
    }

    /// Doubles the position buffer if the next position would not fit.
    fn reserve_position(&mut self) {
        if self.positions.len() + 3 > self.positions.capacity() {
            let additional = self.positions.capacity().max(3);
            self.positions.reserve_exact(additional);
        }
    }

    /// Doubles the index buffer if the next triangle would not fit.
    fn reserve_triangle(&mut self) {
        if self.indices.len() + 3 > self.indices.capacity() {
            let additional = self.indices.capacity().max(3);
            self.indices.reserve_exact(additional);
        }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Mesh {
    /// Clones the buffers under a fresh [`MeshId`]: the copy can diverge from
    /// the original, so caches must not be shared between them.
    fn clone(&self) -> Self {
        Self {
            id: MeshId::next(),
            positions: self.positions.clone(),
            indices: self.indices.clone(),
            max_abs_coordinate: self.max_abs_coordinate,
        }
    }
}
