//! Classification of mesh triangles against a plane.

use crate::bounds::BoundingSphereCache;
use crate::plane::side_of_distance;
use crate::{BspConfig, BspError, BspResult, Mesh, Plane3D, PlaneSide};

/// How a triangle relates to a plane.
///
/// Exactly one kind applies to any triangle, decided from how many of its
/// corners lie in front of, behind, or on the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassificationKind {
    /// No corner behind, at most one on the plane.
    Front,
    /// No corner in front, at most one on the plane.
    Back,
    /// Corners on both sides, none on the plane.
    SplitNoneCoplanar,
    /// One corner in front, one behind, one on the plane.
    SplitOneCoplanar,
    /// All three corners on the plane.
    AllCoplanar,
    /// One corner in front, the other two on the plane.
    FrontTwoVerticesCoplanar,
    /// One corner behind, the other two on the plane.
    BackTwoVerticesCoplanar,
}

impl ClassificationKind {
    /// Decides the kind from per-side corner counts.
    ///
    /// Fails with [`BspError::InternalInvariant`] for counts that do not
    /// describe a triangle.
    pub fn from_counts(front: usize, back: usize, coplanar: usize) -> BspResult<Self> {
        let kind = match (front, back, coplanar) {
            (f, 0, c) if f > 0 && c < 2 && f + c == 3 => Self::Front,
            (0, b, c) if b > 0 && c < 2 && b + c == 3 => Self::Back,
            (f, b, 0) if f > 0 && b > 0 && f + b == 3 => Self::SplitNoneCoplanar,
            (1, 1, 1) => Self::SplitOneCoplanar,
            (0, 0, 3) => Self::AllCoplanar,
            (1, 0, 2) => Self::FrontTwoVerticesCoplanar,
            (0, 1, 2) => Self::BackTwoVerticesCoplanar,
            _ => {
                return Err(BspError::invariant(format!(
                    "unclassified: {front} front, {back} back, {coplanar} coplanar"
                )));
            }
        };
        Ok(kind)
    }

    /// The half-space a non-straddling triangle is filed under when building
    /// a tree, or `None` if the triangle must be split first.
    ///
    /// Coplanar triangles fold into the front half-space.
    pub fn side(self) -> Option<PlaneSide> {
        match self {
            Self::Front | Self::AllCoplanar | Self::FrontTwoVerticesCoplanar => {
                Some(PlaneSide::Front)
            }
            Self::Back | Self::BackTwoVerticesCoplanar => Some(PlaneSide::Back),
            Self::SplitNoneCoplanar | Self::SplitOneCoplanar => None,
        }
    }

    /// Returns `true` for the two straddling kinds.
    #[inline]
    pub fn is_split(self) -> bool {
        self.side().is_none()
    }
}

/// The result of classifying one triangle against one plane.
///
/// `front`, `back` and `coplanar` hold corner slots (`0`, `1`, `2` in the
/// triangle's winding order); together they contain each slot exactly once.
/// When the bounding-sphere early-out decided the result, every slot is
/// filed on the decided side and no distances are recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    kind: ClassificationKind,
    triangle: usize,
    front: Vec<usize>,
    back: Vec<usize>,
    coplanar: Vec<usize>,
    distances: Option<[f64; 3]>,
}

impl Classification {
    fn whole(triangle: usize, side: PlaneSide) -> Self {
        let all = vec![0, 1, 2];
        let (kind, front, back) = match side {
            PlaneSide::Back => (ClassificationKind::Back, Vec::new(), all),
            _ => (ClassificationKind::Front, all, Vec::new()),
        };
        Self {
            kind,
            triangle,
            front,
            back,
            coplanar: Vec::new(),
            distances: None,
        }
    }

    /// The classification kind.
    #[inline]
    pub fn kind(&self) -> ClassificationKind {
        self.kind
    }

    /// The classified triangle.
    #[inline]
    pub fn triangle(&self) -> usize {
        self.triangle
    }

    /// Slots of corners in front of the plane.
    #[inline]
    pub fn front(&self) -> &[usize] {
        &self.front
    }

    /// Slots of corners behind the plane.
    #[inline]
    pub fn back(&self) -> &[usize] {
        &self.back
    }

    /// Slots of corners on the plane.
    #[inline]
    pub fn coplanar(&self) -> &[usize] {
        &self.coplanar
    }

    /// Signed distance of each corner, by slot, if per-corner work ran.
    #[inline]
    pub fn distances(&self) -> Option<[f64; 3]> {
        self.distances
    }

    /// Returns `true` if the bounding-sphere early-out decided this result.
    #[inline]
    pub fn is_early_out(&self) -> bool {
        self.distances.is_none()
    }
}

/// Classifies triangles against planes, caching bounding spheres.
///
/// A classifier is scoped to one build: its sphere cache binds to the first
/// mesh it sees and resets if handed a different one.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: BspConfig,
    spheres: BoundingSphereCache,
}

impl Classifier {
    /// Creates a classifier with the given tolerances.
    pub fn new(config: BspConfig) -> Self {
        Self {
            config,
            spheres: BoundingSphereCache::new(),
        }
    }

    /// The tolerances in use.
    #[inline]
    pub fn config(&self) -> &BspConfig {
        &self.config
    }

    /// The bounding-sphere cache.
    #[inline]
    pub fn spheres(&self) -> &BoundingSphereCache {
        &self.spheres
    }

    /// Classifies triangle `triangle` of `mesh` against `plane`.
    ///
    /// Corners are bucketed by signed distance using the coplanar band of
    /// [`BspConfig::coplanar_band`], sized from the mesh's largest
    /// coordinate. Triangles whose bounding sphere lies farther than
    /// `radius + margin` from the plane are decided without looking at their
    /// corners, with the margin never narrower than that band.
    ///
    /// Fails with [`BspError::TriangleOutOfBounds`] for a missing triangle.
    pub fn classify(
        &mut self,
        plane: &Plane3D,
        mesh: &Mesh,
        triangle: usize,
    ) -> BspResult<Classification> {
        let sphere = self.spheres.get(mesh, triangle)?;
        let magnitude = mesh.max_abs_coordinate();
        let band = self.config.coplanar_band(magnitude);

        let reach = sphere.radius + self.config.sphere_margin(magnitude);
        let center_distance = plane.signed_distance(&sphere.center);
        if center_distance > reach {
            return Ok(Classification::whole(triangle, PlaneSide::Front));
        }
        if center_distance < -reach {
            return Ok(Classification::whole(triangle, PlaneSide::Back));
        }

        let mut front = Vec::with_capacity(3);
        let mut back = Vec::with_capacity(3);
        let mut coplanar = Vec::with_capacity(3);
        let mut distances = [0.0; 3];

        for slot in 0..3 {
            let distance = plane.signed_distance_to_slot(mesh, triangle, slot)?;
            match side_of_distance(distance, band) {
                PlaneSide::Front => front.push(slot),
                PlaneSide::Back => back.push(slot),
                PlaneSide::OnPlane => coplanar.push(slot),
            }
            distances[slot] = distance;
        }

        let kind = ClassificationKind::from_counts(front.len(), back.len(), coplanar.len())?;
        Ok(Classification {
            kind,
            triangle,
            front,
            back,
            coplanar,
            distances: Some(distances),
        })
    }
}

impl Plane3D {
    /// Classifies triangle `triangle` of `mesh` with default tolerances.
    ///
    /// Use a [`Classifier`] to reuse bounding spheres across many calls.
    pub fn classify_polygon(&self, mesh: &Mesh, triangle: usize) -> BspResult<Classification> {
        Classifier::default().classify(self, mesh, triangle)
    }
}
