//! Per-triangle bounding spheres used to skip per-vertex classification.

use nalgebra::Point3;
use tracing::debug;

use crate::{BspResult, Mesh, MeshId};

/// A sphere enclosing a triangle.
///
/// The center is the center of the triangle's axis-aligned bounding box and
/// the radius is half of that box's diagonal. This is not the minimal
/// enclosing sphere, but it is cheap and always contains all three corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Center of the sphere.
    pub center: Point3<f64>,
    /// Radius of the sphere.
    pub radius: f64,
}

impl BoundingSphere {
    /// Computes the bounding sphere of triangle `triangle` of `mesh`.
    pub fn of_triangle(mesh: &Mesh, triangle: usize) -> BspResult<Self> {
        let points = mesh
            .try_triangle(triangle)?
            .map(|index| mesh.position(index).cast::<f64>());

        let mut mins = points[0];
        let mut maxs = points[0];
        for p in &points[1..] {
            mins = mins.inf(p);
            maxs = maxs.sup(p);
        }

        let half_extent = (maxs - mins) * 0.5;
        Ok(Self {
            center: mins + half_extent,
            radius: half_extent.norm(),
        })
    }
}

/// Lazily filled bounding spheres, addressed by triangle index.
///
/// A cache belongs to one mesh: the first lookup binds it to that mesh's
/// [`MeshId`], and a lookup against any other mesh clears it first. Entries
/// stay valid for the bound mesh because triangles are append-only.
#[derive(Debug, Clone, Default)]
pub struct BoundingSphereCache {
    mesh: Option<MeshId>,
    spheres: Vec<Option<BoundingSphere>>,
}

impl BoundingSphereCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bounding sphere of `triangle`, computing it on first use.
    ///
    /// Fails with [`BspError::TriangleOutOfBounds`](crate::BspError) if the
    /// mesh has no such triangle.
    pub fn get(&mut self, mesh: &Mesh, triangle: usize) -> BspResult<BoundingSphere> {
        mesh.try_triangle(triangle)?;
        if self.mesh != Some(mesh.id()) {
            if self.mesh.is_some() {
                debug!(cached = self.cached(), "Bounding-sphere cache rebound to another mesh");
            }
            self.mesh = Some(mesh.id());
            self.spheres.clear();
        }

        if triangle >= self.spheres.len() {
            self.spheres.resize(mesh.num_triangles().max(triangle + 1), None);
        }

        let slot = &mut self.spheres[triangle];
        if let Some(sphere) = *slot {
            return Ok(sphere);
        }
        let sphere = BoundingSphere::of_triangle(mesh, triangle)?;
        *slot = Some(sphere);
        Ok(sphere)
    }

    /// Number of spheres currently cached.
    pub fn cached(&self) -> usize {
        self.spheres.iter().filter(|s| s.is_some()).count()
    }

    /// Drops every cached sphere.
    pub fn clear(&mut self) {
        self.mesh = None;
        self.spheres.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_triangle_mesh() -> Mesh {
        Mesh::from_triangles([
            [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0]],
            [[0.0, 0.0, -10.0], [5.0, 0.0, 3.0], [0.0, 0.0, 10.0]],
        ])
        .unwrap()
    }

    #[test]
    fn sphere_from_bounding_box() {
        let mesh = two_triangle_mesh();
        let sphere = BoundingSphere::of_triangle(&mesh, 1).unwrap();

        assert_relative_eq!(sphere.center, Point3::new(2.5, 0.0, 0.0));
        assert_relative_eq!(sphere.radius, (2.5f64 * 2.5 + 10.0 * 10.0).sqrt());
    }

    #[test]
    fn sphere_contains_corners() {
        let mesh = two_triangle_mesh();
        for t in 0..mesh.num_triangles() {
            let sphere = BoundingSphere::of_triangle(&mesh, t).unwrap();
            for p in mesh.triangle_points(t) {
                let d = (p.cast::<f64>() - sphere.center).norm();
                assert!(d <= sphere.radius + 1e-9);
            }
        }
    }

    #[test]
    fn cache_fills_lazily() {
        let mesh = two_triangle_mesh();
        let mut cache = BoundingSphereCache::new();
        assert_eq!(cache.cached(), 0);

        let first = cache.get(&mesh, 1).unwrap();
        assert_eq!(cache.cached(), 1);
        assert_eq!(cache.get(&mesh, 1).unwrap(), first);
        assert_eq!(cache.cached(), 1);
    }

    #[test]
    fn cache_resets_for_other_mesh() {
        let mesh = two_triangle_mesh();
        let other = Mesh::from_triangles([[[0.0, 0.0, 5.0], [1.0, 0.0, 5.0], [0.0, 1.0, 5.0]]])
            .unwrap();

        let mut cache = BoundingSphereCache::new();
        cache.get(&mesh, 0).unwrap();
        cache.get(&mesh, 1).unwrap();
        assert_eq!(cache.cached(), 2);

        let sphere = cache.get(&other, 0).unwrap();
        assert_eq!(cache.cached(), 1);
        assert_relative_eq!(sphere.center.z, 5.0);
    }

    #[test]
    fn cache_sees_appended_triangles() {
        let mut mesh = two_triangle_mesh();
        let mut cache = BoundingSphereCache::new();
        cache.get(&mesh, 0).unwrap();

        let t = mesh
            .add_triangle([[0.0, 0.0, 20.0], [2.0, 0.0, 20.0], [0.0, 2.0, 20.0]])
            .unwrap();
        let sphere = cache.get(&mesh, t).unwrap();
        assert_relative_eq!(sphere.center, Point3::new(1.0, 1.0, 20.0));
    }

    #[test]
    fn missing_triangle_is_an_error() {
        let mesh = two_triangle_mesh();
        let mut cache = BoundingSphereCache::new();
        assert!(matches!(
            cache.get(&mesh, 2),
            Err(crate::BspError::TriangleOutOfBounds {
                triangle: 2,
                num_triangles: 2
            })
        ));
        assert_eq!(cache.cached(), 0);
        assert!(BoundingSphere::of_triangle(&mesh, usize::MAX).is_err());
    }
}
