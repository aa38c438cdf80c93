//! Indexed triangle mesh kernel with BSP (Binary Space Partitioning) trees.
//!
//! A [`Mesh`] stores triangles as flat `f32` position and `u32` index
//! buffers. [`BspTree::build`] partitions the mesh with planes taken from its
//! own triangles, splitting straddling triangles exactly at the plane and
//! appending the pieces to the same mesh.
//!
//! ```
//! use bsp_mesh::{BspTree, ClassificationKind, Mesh, Plane3D};
//!
//! let mut mesh = Mesh::new();
//! mesh.add_triangle([[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0]])?;
//! mesh.add_triangle([[0.0, 0.0, -10.0], [5.0, 0.0, 3.0], [0.0, 0.0, 10.0]])?;
//!
//! let plane = Plane3D::from_triangle(&mesh, 0)?;
//! let kind = plane.classify_polygon(&mesh, 1)?.kind();
//! assert_eq!(kind, ClassificationKind::SplitNoneCoplanar);
//!
//! let tree = BspTree::build(&mut mesh)?;
//! assert_eq!(mesh.num_triangles(), 5);
//! assert_eq!(tree.triangle_count(), 4);
//! # Ok::<(), bsp_mesh::BspError>(())
//! ```

mod bounds;
mod classify;
mod config;
mod error;
mod mesh;
mod plane;
mod split;
mod weld;

pub mod bsp;
pub mod primitives;

pub use bounds::{BoundingSphere, BoundingSphereCache};
pub use bsp::{BspTree, create_bsp_tree};
pub use classify::{Classification, ClassificationKind, Classifier};
pub use config::{BspConfig, ROUNDING_BAND_ULPS, SPHERE_EPSILON, VERTEX_EPSILON};
pub use error::{BspError, BspResult};
pub use mesh::{DEFAULT_RESERVED_TRIANGLES, Mesh, MeshId};
pub use plane::{Plane3D, PlaneSide};
pub use split::{SplitResult, SplitTriangle, StraddleOrder, reorder_straddling_points};
pub use weld::SplitVertexWelder;
