//! Plane representation and operations for BSP trees.

use nalgebra::{Point3, Vector3};

use crate::config::VERTEX_EPSILON;
use crate::{BspError, BspResult, Mesh};

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
}

/// A plane in 3D space, represented as `normal · point = offset`.
///
/// Plane arithmetic runs in `f64` on top of the mesh's `f32` storage, so
/// distances and intersection points lose no precision before they are
/// rounded back into the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane3D {
    normal: Vector3<f64>,
    offset: f64,
}

impl Plane3D {
    /// Creates a plane from a normal vector and offset.
    /// The normal is normalized and the offset scaled to match.
    ///
    /// Fails with [`BspError::DegenerateGeometry`] if the normal has zero
    /// length or either input is non-finite.
    pub fn new(normal: Vector3<f64>, offset: f64) -> BspResult<Self> {
        let norm = normal.norm();
        Self::checked(normal / norm, offset / norm)
    }

    /// Creates a plane from three points.
    /// The normal direction follows the right-hand rule: (b - a) × (c - a).
    ///
    /// Fails with [`BspError::DegenerateGeometry`] if the points are
    /// collinear or coincident.
    pub fn from_three_points(a: Point3<f64>, b: Point3<f64>, c: Point3<f64>) -> BspResult<Self> {
        let normal = (b - a).cross(&(c - a)).normalize();
        Self::checked(normal, normal.dot(&a.coords))
    }

    /// Derives the plane of triangle `triangle` of `mesh`.
    ///
    /// A zero-area triangle has no normal; normalizing its zero cross product
    /// produces NaN, which is reported as [`BspError::DegenerateGeometry`].
    /// A missing triangle is [`BspError::TriangleOutOfBounds`].
    pub fn from_triangle(mesh: &Mesh, triangle: usize) -> BspResult<Self> {
        let [a, b, c] = mesh
            .try_triangle(triangle)?
            .map(|index| mesh.position(index).cast::<f64>());
        Self::from_three_points(a, b, c).map_err(|_| {
            BspError::degenerate(format!("triangle {triangle} has zero area"))
        })
    }

    fn checked(normal: Vector3<f64>, offset: f64) -> BspResult<Self> {
        if !offset.is_finite() || !normal.iter().all(|c| c.is_finite()) {
            return Err(BspError::degenerate("plane normal cannot be zero"));
        }
        Ok(Self { normal, offset })
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is in front (same side as normal)
    /// - Negative: point is behind (opposite side from normal)
    /// - Zero: point is on the plane
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Signed distance of corner `slot` (0, 1 or 2) of `triangle` to the plane.
    ///
    /// Fails with [`BspError::DegenerateGeometry`] on a non-finite result.
    pub fn signed_distance_to_slot(
        &self,
        mesh: &Mesh,
        triangle: usize,
        slot: usize,
    ) -> BspResult<f64> {
        let Some(&index) = mesh.try_triangle(triangle)?.get(slot) else {
            return Err(BspError::invariant(format!("triangle slot {slot} is not 0, 1 or 2")));
        };
        let d = self.signed_distance(&mesh.position(index).cast::<f64>());
        if !d.is_finite() {
            return Err(BspError::degenerate(format!(
                "non-finite distance for position {index} of triangle {triangle}"
            )));
        }
        Ok(d)
    }

    /// Classifies which side of the plane a point lies on.
    /// Uses the default vertex epsilon.
    #[inline]
    pub fn classify_point(&self, point: &Point3<f64>) -> PlaneSide {
        self.classify_point_with_epsilon(point, VERTEX_EPSILON)
    }

    /// Classifies which side of the plane a point lies on, with a custom epsilon.
    pub fn classify_point_with_epsilon(&self, point: &Point3<f64>, epsilon: f64) -> PlaneSide {
        side_of_distance(self.signed_distance(point), epsilon)
    }

    /// Returns a new plane with the normal flipped (facing the opposite direction).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Intersects the line `origin + t * direction` with the plane.
    ///
    /// Evaluates `origin + direction * ((p0 - origin) · n / (direction · n))`
    /// with `p0 = n * offset`. A direction parallel to the plane yields a
    /// non-finite point; callers appending it to a mesh get
    /// [`BspError::DegenerateGeometry`] from [`Mesh::add_position`].
    pub fn line_intersection(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> Point3<f64> {
        let p0 = Point3::from(self.normal * self.offset);
        let t = (p0 - *origin).dot(&self.normal) / direction.dot(&self.normal);
        *origin + direction * t
    }
}

/// Buckets a signed distance using a symmetric epsilon band.
#[inline]
pub(crate) fn side_of_distance(distance: f64, epsilon: f64) -> PlaneSide {
    if distance > epsilon {
        PlaneSide::Front
    } else if distance < -epsilon {
        PlaneSide::Back
    } else {
        PlaneSide::OnPlane
    }
}
