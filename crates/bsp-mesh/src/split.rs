//! Splitting of straddling triangles at a plane.
//!
//! Both splitters compute exact edge/plane intersection points, append them
//! to the mesh, append the child triangles, and report the children sorted
//! into the front and back half-spaces. Every child keeps the winding (and
//! therefore the normal direction) of the triangle it was cut from. The
//! original triangle stays in the mesh untouched.
//!
//! A child whose corners coincide after rounding to `f32` has zero area; it
//! is neither appended nor reported.

use nalgebra::Vector3;
use tracing::debug;

use crate::classify::{Classification, ClassificationKind};
use crate::weld::SplitVertexWelder;
use crate::{BspError, BspResult, Mesh, Plane3D};

/// A triangle appended by a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SplitTriangle {
    /// Index of the new triangle in the mesh.
    pub index: usize,
    /// Its position indices, in winding order.
    pub vertices: [u32; 3],
}

/// Children of a split, by half-space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitResult {
    /// Children in front of the plane.
    pub front: Vec<SplitTriangle>,
    /// Children behind the plane.
    pub back: Vec<SplitTriangle>,
}

impl SplitResult {
    /// Vertex triples of the front children.
    pub fn front_vertices(&self) -> Vec<[u32; 3]> {
        self.front.iter().map(|t| t.vertices).collect()
    }

    /// Vertex triples of the back children.
    pub fn back_vertices(&self) -> Vec<[u32; 3]> {
        self.back.iter().map(|t| t.vertices).collect()
    }

    /// Total number of children.
    pub fn len(&self) -> usize {
        self.front.len() + self.back.len()
    }

    /// Returns `true` if there are no children.
    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.back.is_empty()
    }
}

/// Corner order for cutting a triangle with no corner on the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StraddleOrder {
    /// Corner slots `[a, b, c]`: `a` is alone on its side, `b` and `c`
    /// follow it in the triangle's winding order.
    pub slots: [usize; 3],
    /// `true` if `b` and `c` are in front of the plane.
    pub more_in_front: bool,
}

/// Reorders a straddling triangle's corners so that edges `a–b` and `a–c`
/// cross the plane and `b–c` does not.
///
/// The lone corner becomes `a` and the other two keep their cyclic order
/// after it, so `(a, b, c)` is a rotation of the original winding and has
/// the same orientation.
pub fn reorder_straddling_points(classification: &Classification) -> BspResult<StraddleOrder> {
    expect_kind(classification, ClassificationKind::SplitNoneCoplanar)?;

    let more_in_front = classification.front().len() > classification.back().len();
    let lone = if more_in_front {
        classification.back()[0]
    } else {
        classification.front()[0]
    };

    Ok(StraddleOrder {
        slots: [lone, (lone + 1) % 3, (lone + 2) % 3],
        more_in_front,
    })
}

impl Plane3D {
    /// Splits a triangle with one corner on the plane, one in front and one
    /// behind into two triangles.
    ///
    /// The edge between the front and back corners is cut at point `i`.
    /// With original winding `(coplanar, front, back)` the children are
    /// `(coplanar, front, i)` in front and `(i, back, coplanar)` behind; the
    /// mirrored winding mirrors the assignment. A child that rounds to zero
    /// area is dropped.
    pub fn split_polygon_one_coplanar(
        &self,
        mesh: &mut Mesh,
        classification: &Classification,
    ) -> BspResult<SplitResult> {
        self.split_polygon_one_coplanar_with(mesh, classification, &mut SplitVertexWelder::disabled())
    }

    /// [`split_polygon_one_coplanar`](Self::split_polygon_one_coplanar),
    /// placing the new vertex through `welder`.
    pub fn split_polygon_one_coplanar_with(
        &self,
        mesh: &mut Mesh,
        classification: &Classification,
        welder: &mut SplitVertexWelder,
    ) -> BspResult<SplitResult> {
        expect_kind(classification, ClassificationKind::SplitOneCoplanar)?;

        let triangle = mesh.try_triangle(classification.triangle())?;
        let coplanar_slot = classification.coplanar()[0];
        let front_slot = classification.front()[0];
        let back_slot = classification.back()[0];

        let front = mesh.position(triangle[front_slot]).cast::<f64>();
        let back = mesh.position(triangle[back_slot]).cast::<f64>();
        let cut = welder.insert(mesh, self.line_intersection(&front, &(back - front)))?;

        let next_slot = (coplanar_slot + 1) % 3;
        let after_slot = (coplanar_slot + 2) % 3;
        let first = append(mesh, [triangle[coplanar_slot], triangle[next_slot], cut])?;
        let second = append(mesh, [cut, triangle[after_slot], triangle[coplanar_slot]])?;

        debug!(
            triangle = classification.triangle(),
            children = 2,
            "Split triangle with one coplanar vertex"
        );

        let (front, back) = if next_slot == front_slot {
            (first, second)
        } else {
            (second, first)
        };
        Ok(SplitResult {
            front: front.into_iter().collect(),
            back: back.into_iter().collect(),
        })
    }

    /// Splits a triangle with corners on both sides and none on the plane
    /// into three triangles.
    ///
    /// After [`reorder_straddling_points`], edges `a–b` and `a–c` are cut at
    /// `ab` and `ac`. The lone side receives `(a, ab, ac)`; the other side
    /// receives `(ab, b, ac)` and `(b, c, ac)`. Zero-area children are
    /// dropped, so fewer than three may come back.
    pub fn split_polygon_none_coplanar(
        &self,
        mesh: &mut Mesh,
        classification: &Classification,
    ) -> BspResult<SplitResult> {
        self.split_polygon_none_coplanar_with(
            mesh,
            classification,
            &mut SplitVertexWelder::disabled(),
        )
    }

    /// [`split_polygon_none_coplanar`](Self::split_polygon_none_coplanar),
    /// placing new vertices through `welder`.
    pub fn split_polygon_none_coplanar_with(
        &self,
        mesh: &mut Mesh,
        classification: &Classification,
        welder: &mut SplitVertexWelder,
    ) -> BspResult<SplitResult> {
        let order = reorder_straddling_points(classification)?;
        let triangle = mesh.try_triangle(classification.triangle())?;
        let [ia, ib, ic] = order.slots.map(|slot| triangle[slot]);

        let a = mesh.position(ia).cast::<f64>();
        let b = mesh.position(ib).cast::<f64>();
        let c = mesh.position(ic).cast::<f64>();

        let ab = welder.insert(mesh, self.line_intersection(&a, &(b - a)))?;
        let ac = welder.insert(mesh, self.line_intersection(&a, &(c - a)))?;

        let lone = append(mesh, [ia, ab, ac])?;
        let near_b = append(mesh, [ab, ib, ac])?;
        let far = append(mesh, [ib, ic, ac])?;

        debug!(
            triangle = classification.triangle(),
            children = 3,
            more_in_front = order.more_in_front,
            "Split triangle with no coplanar vertex"
        );

        let majority: Vec<SplitTriangle> = near_b.into_iter().chain(far).collect();
        let minority: Vec<SplitTriangle> = lone.into_iter().collect();
        let (front, back) = if order.more_in_front {
            (majority, minority)
        } else {
            (minority, majority)
        };
        Ok(SplitResult { front, back })
    }
}

/// Appends a child triangle unless rounding to `f32` (or welding) collapsed
/// it to zero area, in which case it covers nothing and is dropped.
fn append(mesh: &mut Mesh, vertices: [u32; 3]) -> BspResult<Option<SplitTriangle>> {
    let [a, b, c] = vertices.map(|i| mesh.position(i).cast::<f64>());
    if (b - a).cross(&(c - a)) == Vector3::zeros() {
        debug!(?vertices, "Dropped zero-area split triangle");
        return Ok(None);
    }
    let index = mesh.add_triangle_using_indices(vertices)?;
    Ok(Some(SplitTriangle { index, vertices }))
}

fn expect_kind(classification: &Classification, expected: ClassificationKind) -> BspResult<()> {
    if classification.kind() != expected {
        return Err(BspError::invariant(format!(
            "triangle {} classified {:?}, expected {:?}",
            classification.triangle(),
            classification.kind(),
            expected
        )));
    }
    Ok(())
}
