//! Optional reuse of split-generated vertices.
//!
//! Splitting the same edge against the same plane from two neighbouring
//! triangles produces two numerically identical intersection points. Without
//! welding both are appended, which leaves duplicate vertices (and, after
//! rounding, hairline cracks) in the mesh. A [`SplitVertexWelder`] with a
//! tolerance keeps a hash grid of the vertices it has appended and returns an
//! existing index when a new point lands within the tolerance of one.
//!
//! Only vertices created through the welder are candidates: original mesh
//! positions are never merged.

use ahash::AHashMap;

use nalgebra::Point3;
use tracing::debug;

use crate::{BspResult, Mesh};

type CellKey = [i64; 3];

/// Appends split vertices to a mesh, optionally merging near-duplicates.
#[derive(Debug, Clone, Default)]
pub struct SplitVertexWelder {
    tolerance: Option<f64>,
    grid: AHashMap<CellKey, Vec<u32>>,
    merged: usize,
}

impl SplitVertexWelder {
    /// Creates a welder. `None`, a non-positive or a non-finite tolerance
    /// disables merging.
    pub fn new(tolerance: Option<f64>) -> Self {
        Self {
            tolerance: tolerance.filter(|t| t.is_finite() && *t > 0.0),
            grid: AHashMap::new(),
            merged: 0,
        }
    }

    /// A welder that always appends.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Returns `true` if this welder merges vertices.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.tolerance.is_some()
    }

    /// Number of points that were resolved to an existing vertex.
    #[inline]
    pub fn merged(&self) -> usize {
        self.merged
    }

    /// Returns the index of a vertex at `point`, appending one if no earlier
    /// split vertex lies within the tolerance.
    ///
    /// Non-finite points fail with
    /// [`BspError::DegenerateGeometry`](crate::BspError::DegenerateGeometry).
    pub fn insert(&mut self, mesh: &mut Mesh, point: Point3<f64>) -> BspResult<u32> {
        let rounded = [point.x as f32, point.y as f32, point.z as f32];
        let Some(tolerance) = self.tolerance else {
            return mesh.add_position(rounded);
        };
        if !point.iter().all(|c| c.is_finite()) {
            return mesh.add_position(rounded);
        }

        let rounded_point = Point3::from(rounded).cast::<f64>();
        let key = cell_of(&rounded_point, tolerance);
        if let Some(existing) = self.find_near(mesh, &rounded_point, key, tolerance) {
            self.merged += 1;
            debug!(index = existing, "Welded split vertex");
            return Ok(existing);
        }

        let index = mesh.add_position(rounded)?;
        self.grid.entry(key).or_default().push(index);
        Ok(index)
    }

    fn find_near(
        &self,
        mesh: &Mesh,
        point: &Point3<f64>,
        key: CellKey,
        tolerance: f64,
    ) -> Option<u32> {
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbour = [key[0] + dx, key[1] + dy, key[2] + dz];
                    let Some(bucket) = self.grid.get(&neighbour) else {
                        continue;
                    };
                    let hit = bucket.iter().copied().find(|&index| {
                        (mesh.position(index).cast::<f64>() - *point).norm() <= tolerance
                    });
                    if hit.is_some() {
                        return hit;
                    }
                }
            }
        }
        None
    }
}

fn cell_of(point: &Point3<f64>, cell_size: f64) -> CellKey {
    [
        (point.x / cell_size).floor() as i64,
        (point.y / cell_size).floor() as i64,
        (point.z / cell_size).floor() as i64,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_always_appends() {
        let mut mesh = Mesh::new();
        let mut welder = SplitVertexWelder::disabled();
        let a = welder.insert(&mut mesh, Point3::new(1.0, 2.0, 3.0)).unwrap();
        let b = welder.insert(&mut mesh, Point3::new(1.0, 2.0, 3.0)).unwrap();

        assert_ne!(a, b);
        assert_eq!(mesh.num_positions(), 2);
        assert!(!welder.is_enabled());
    }

    #[test]
    fn enabled_merges_within_tolerance() {
        let mut mesh = Mesh::new();
        let mut welder = SplitVertexWelder::new(Some(1e-3));
        let a = welder.insert(&mut mesh, Point3::new(1.0, 2.0, 3.0)).unwrap();
        let b = welder.insert(&mut mesh, Point3::new(1.0002, 2.0, 3.0)).unwrap();
        let c = welder.insert(&mut mesh, Point3::new(1.1, 2.0, 3.0)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(mesh.num_positions(), 2);
        assert_eq!(welder.merged(), 1);
    }

    #[test]
    fn merges_across_cell_boundaries() {
        let mut mesh = Mesh::new();
        let mut welder = SplitVertexWelder::new(Some(0.5));
        let a = welder.insert(&mut mesh, Point3::new(0.49, 0.0, 0.0)).unwrap();
        let b = welder.insert(&mut mesh, Point3::new(0.51, 0.0, 0.0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn grid_spans_many_cells() {
        let mut mesh = Mesh::new();
        let mut welder = SplitVertexWelder::new(Some(0.01));
        let lattice: Vec<Point3<f64>> = (0..10)
            .flat_map(|i| (0..10).map(move |j| Point3::new(f64::from(i), f64::from(j), -250.0)))
            .collect();

        let first: Vec<u32> = lattice
            .iter()
            .map(|p| welder.insert(&mut mesh, *p).unwrap())
            .collect();
        let again: Vec<u32> = lattice
            .iter()
            .map(|p| welder.insert(&mut mesh, p + nalgebra::Vector3::new(0.004, -0.004, 0.0)))
            .collect::<BspResult<_>>()
            .unwrap();

        assert_eq!(first, again);
        assert_eq!(mesh.num_positions(), 100);
        assert_eq!(welder.merged(), 100);
    }

    #[test]
    fn ignores_original_positions() {
        let mut mesh = Mesh::new();
        mesh.add_position([1.0, 1.0, 1.0]).unwrap();
        let mut welder = SplitVertexWelder::new(Some(0.1));
        let index = welder.insert(&mut mesh, Point3::new(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(index, 1);
    }

    #[test]
    fn invalid_tolerance_disables() {
        assert!(!SplitVertexWelder::new(Some(0.0)).is_enabled());
        assert!(!SplitVertexWelder::new(Some(f64::NAN)).is_enabled());
        assert!(SplitVertexWelder::new(Some(1e-6)).is_enabled());
    }

    #[test]
    fn non_finite_points_fail() {
        let mut mesh = Mesh::new();
        let mut welder = SplitVertexWelder::new(Some(1e-3));
        assert!(welder.insert(&mut mesh, Point3::new(f64::NAN, 0.0, 0.0)).is_err());
        assert_eq!(mesh.num_positions(), 0);
    }
}
