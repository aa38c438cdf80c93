//! Primitive mesh generators.

use std::f64::consts::PI;

use nalgebra::Point3;

use crate::{BspError, BspResult, Mesh};

/// Parameters for [`sphere`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereOptions {
    /// Center of the sphere.
    pub center: Point3<f32>,
    /// Radius; must be finite and positive.
    pub radius: f32,
    /// Number of longitudinal slices. Values below 4 are raised to 4.
    pub resolution: usize,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            radius: 1.0,
            resolution: 4,
        }
    }
}

impl SphereOptions {
    /// Sets the center.
    #[must_use]
    pub fn with_center(mut self, center: Point3<f32>) -> Self {
        self.center = center;
        self
    }

    /// Sets the radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the resolution.
    #[must_use]
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }
}

/// Generates a latitude/longitude sphere with outward-facing
/// counter-clockwise triangles.
///
/// With `h = max(resolution, 4)` slices, the sphere has `v = round(h / 4)`
/// stacks (made even), shared poles, and `2 * h * (v - 1)` triangles.
///
/// ```
/// use bsp_mesh::primitives::{sphere, SphereOptions};
///
/// let octahedron = sphere(&SphereOptions::default().with_resolution(1))?;
/// assert_eq!(octahedron.num_positions(), 6);
/// assert_eq!(octahedron.num_triangles(), 8);
/// # Ok::<(), bsp_mesh::BspError>(())
/// ```
pub fn sphere(options: &SphereOptions) -> BspResult<Mesh> {
    if !(options.radius.is_finite() && options.radius > 0.0) {
        return Err(BspError::degenerate(format!(
            "sphere radius {} is not finite and positive",
            options.radius
        )));
    }

    let slices = options.resolution.max(4);
    let mut stacks = (slices as f64 / 4.0).round() as usize;
    if stacks % 2 == 1 {
        stacks += 1;
    }

    let mut mesh = Mesh::with_capacity(2 * slices * (stacks - 1));
    let radius = f64::from(options.radius);
    let center = options.center.cast::<f64>();
    let mut at = |x: f64, y: f64, z: f64| {
        mesh.add_position([
            (center.x + x) as f32,
            (center.y + y) as f32,
            (center.z + z) as f32,
        ])
    };

    let top = at(0.0, 0.0, radius)?;
    let bottom = at(0.0, 0.0, -radius)?;

    // rings[slice][stack], poles included at both ends.
    let mut rings: Vec<Vec<u32>> = Vec::with_capacity(slices);
    for slice in 0..slices {
        let theta = 2.0 * PI * slice as f64 / slices as f64;
        let cos_theta = if 4 * slice == slices || 4 * slice == 3 * slices {
            0.0
        } else {
            theta.cos()
        };
        let sin_theta = if 2 * slice == slices { 0.0 } else { theta.sin() };

        let mut ring = Vec::with_capacity(stacks + 1);
        ring.push(top);
        for stack in 1..stacks {
            let (cos_phi, sin_phi) = if 2 * stack == stacks {
                (0.0, 1.0)
            } else {
                let phi = PI * stack as f64 / stacks as f64;
                (phi.cos(), phi.sin())
            };
            ring.push(at(
                radius * cos_theta * sin_phi,
                radius * sin_theta * sin_phi,
                radius * cos_phi,
            )?);
        }
        ring.push(bottom);
        rings.push(ring);
    }

    for slice in 1..=slices {
        let current = &rings[slice % slices];
        let previous = &rings[slice - 1];
        for stack in 1..=stacks {
            if stack < stacks {
                mesh.add_triangle_using_indices([
                    current[stack],
                    current[stack - 1],
                    previous[stack],
                ])?;
            }
            if stack > 1 {
                mesh.add_triangle_using_indices([
                    previous[stack],
                    current[stack - 1],
                    previous[stack - 1],
                ])?;
            }
        }
    }

    Ok(mesh)
}
