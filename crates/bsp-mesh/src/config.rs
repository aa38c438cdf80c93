//! Tolerances used by classification, splitting and tree construction.
//!
//! The two epsilons are policy, not physics: raising `vertex_epsilon` makes
//! more vertices count as coplanar (fewer splits, coarser cuts), lowering it
//! makes classification stricter. `sphere_epsilon` only widens the
//! bounding-sphere early-out and never changes a result once per-vertex
//! classification runs.
//!
//! Both are floors. Split vertices are stored as `f32`, so a vertex cut
//! exactly onto a plane can land up to half an ulp of the mesh's largest
//! coordinate away from it. [`BspConfig::coplanar_band`] widens the coplanar
//! band to [`ROUNDING_BAND_ULPS`] ulps of that magnitude, which keeps
//! classification invariant under uniform scaling of the mesh.
//!
//! # Example
//!
//! ```
//! use bsp_mesh::BspConfig;
//!
//! let config = BspConfig::default()
//!     .with_vertex_epsilon(1e-5)
//!     .with_weld_tolerance(1e-5);
//! assert_eq!(config.weld_tolerance, Some(1e-5));
//! ```

/// Default distance within which a vertex is considered on a plane.
pub const VERTEX_EPSILON: f64 = 1e-6;

/// Default margin added to a bounding-sphere radius before a triangle is
/// rejected as wholly in front of or behind a plane.
pub const SPHERE_EPSILON: f64 = 1e-4;

/// Width of the coplanar band in `f32` ulps of the mesh's largest
/// coordinate.
pub const ROUNDING_BAND_ULPS: f64 = 16.0;

/// Configuration for classification and BSP construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BspConfig {
    /// Vertices with `|signed distance| <= vertex_epsilon` are coplanar.
    pub vertex_epsilon: f64,

    /// Margin for the bounding-sphere early-out.
    pub sphere_epsilon: f64,

    /// When set, vertices created by splitting that fall within this
    /// distance of an earlier split vertex are reused instead of appended.
    pub weld_tolerance: Option<f64>,
}

impl Default for BspConfig {
    fn default() -> Self {
        Self {
            vertex_epsilon: VERTEX_EPSILON,
            sphere_epsilon: SPHERE_EPSILON,
            weld_tolerance: None,
        }
    }
}

impl BspConfig {
    /// Tight tolerances for exact, CAD-like input.
    ///
    /// The coplanar band still never drops below `f32` rounding of the
    /// mesh, see [`coplanar_band`](Self::coplanar_band).
    #[must_use]
    pub fn strict() -> Self {
        Self {
            vertex_epsilon: 1e-9,
            sphere_epsilon: 1e-6,
            weld_tolerance: None,
        }
    }

    /// Looser tolerances with vertex welding for noisy scanned meshes.
    ///
    /// ```
    /// use bsp_mesh::BspConfig;
    ///
    /// let config = BspConfig::for_scans();
    /// assert!(config.vertex_epsilon > BspConfig::default().vertex_epsilon);
    /// assert!(config.weld_tolerance.is_some());
    /// ```
    #[must_use]
    pub fn for_scans() -> Self {
        Self {
            vertex_epsilon: 1e-4,
            sphere_epsilon: 1e-3,
            weld_tolerance: Some(1e-4),
        }
    }

    /// Coplanar half-width for a mesh whose largest coordinate has absolute
    /// value `magnitude`: `vertex_epsilon`, or the `f32` storage error at
    /// that magnitude if larger.
    ///
    /// ```
    /// use bsp_mesh::BspConfig;
    ///
    /// let config = BspConfig::default();
    /// assert_eq!(config.coplanar_band(0.01), config.vertex_epsilon);
    /// assert!(config.coplanar_band(1000.0) > 1e-3);
    /// ```
    pub fn coplanar_band(&self, magnitude: f32) -> f64 {
        let rounding = ROUNDING_BAND_ULPS * f64::from(f32::EPSILON) * f64::from(magnitude);
        self.vertex_epsilon.max(rounding)
    }

    /// Margin for the bounding-sphere early-out, never narrower than the
    /// coplanar band so the early-out agrees with per-vertex classification.
    pub fn sphere_margin(&self, magnitude: f32) -> f64 {
        self.sphere_epsilon.max(self.coplanar_band(magnitude))
    }

    /// Set the coplanarity tolerance.
    #[must_use]
    pub fn with_vertex_epsilon(mut self, epsilon: f64) -> Self {
        self.vertex_epsilon = epsilon;
        self
    }

    /// Set the bounding-sphere rejection margin.
    #[must_use]
    pub fn with_sphere_epsilon(mut self, epsilon: f64) -> Self {
        self.sphere_epsilon = epsilon;
        self
    }

    /// Enable welding of split vertices.
    #[must_use]
    pub fn with_weld_tolerance(mut self, tolerance: f64) -> Self {
        self.weld_tolerance = Some(tolerance);
        self
    }

    /// Disable welding of split vertices.
    #[must_use]
    pub fn without_welding(mut self) -> Self {
        self.weld_tolerance = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_documented_epsilons() {
        let config = BspConfig::default();
        assert_eq!(config.vertex_epsilon, 1e-6);
        assert_eq!(config.sphere_epsilon, 1e-4);
        assert!(config.weld_tolerance.is_none());
    }

    #[test]
    fn presets_are_ordered() {
        assert!(BspConfig::strict().vertex_epsilon < BspConfig::default().vertex_epsilon);
        assert!(BspConfig::for_scans().vertex_epsilon > BspConfig::default().vertex_epsilon);
    }

    #[test]
    fn coplanar_band_scales_with_magnitude() {
        let config = BspConfig::default();
        assert_eq!(config.coplanar_band(0.0), VERTEX_EPSILON);
        assert_eq!(config.coplanar_band(1.0), 16.0 * f64::from(f32::EPSILON));
        assert_eq!(
            config.coplanar_band(1024.0),
            1024.0 * config.coplanar_band(1.0)
        );

        // f32 rounding at 1e3 alone exceeds the default epsilon.
        let half_ulp = f64::from(f32::EPSILON) * 1000.0 / 2.0;
        assert!(half_ulp > VERTEX_EPSILON);
        assert!(config.coplanar_band(1000.0) > 8.0 * half_ulp);
    }

    #[test]
    fn sphere_margin_covers_band() {
        let config = BspConfig::default();
        assert_eq!(config.sphere_margin(1.0), SPHERE_EPSILON);
        assert_eq!(config.sphere_margin(1e4), config.coplanar_band(1e4));
    }

    #[test]
    fn builder_methods() {
        let config = BspConfig::default()
            .with_sphere_epsilon(0.5)
            .with_weld_tolerance(0.01);
        assert_eq!(config.sphere_epsilon, 0.5);
        assert_eq!(config.weld_tolerance, Some(0.01));
        assert!(config.without_welding().weld_tolerance.is_none());
    }
}
