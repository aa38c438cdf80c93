//! Binary Space Partitioning tree over mesh triangles.
//!
//! The tree partitions space using planes derived from the mesh's own
//! triangles. Triangles that straddle a partition plane are split, and the
//! pieces are appended to the mesh. The tree enables:
//!
//! - Front-to-back and back-to-front traversal relative to a viewpoint
//! - Spatial queries over triangle indices, without copying geometry
//!
//! # Example
//!
//! ```
//! use bsp_mesh::bsp::{BspTree, CollectingVisitor};
//! use bsp_mesh::Mesh;
//! use nalgebra::Point3;
//!
//! let mut mesh = Mesh::from_triangles([
//!     [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0]],
//!     [[0.0, 0.0, 10.0], [10.0, 0.0, 10.0], [10.0, 10.0, 10.0]],
//!     [[0.0, 0.0, -10.0], [10.0, 0.0, -10.0], [10.0, 10.0, -10.0]],
//! ])?;
//! let tree = BspTree::build(&mut mesh)?;
//!
//! // Painter's order for a viewer above the stack.
//! let eye = Point3::new(5.0, 5.0, 50.0);
//! let mut visitor = CollectingVisitor::new();
//! tree.traverse_back_to_front(&mesh, eye, &mut visitor)?;
//! assert_eq!(visitor.into_triangles(), vec![2, 0, 1]);
//! # Ok::<(), bsp_mesh::BspError>(())
//! ```
//!
//! # Architecture
//!
//! - [`BspTree`]: Index map from partition triangle to [`BspNode`]
//! - [`BspNode`]: Front and back child references
//! - [`PlaneSelector`]: Strategy trait for choosing partitions
//! - [`BspVisitor`]: Visitor trait for custom traversal behavior
//! - [`TrianglePointsVisitor`]: Copies corner points in traversal order

mod node;
mod selector;
mod tree;
mod visitor;

pub use node::BspNode;
pub use selector::{FirstTriangle, PlaneSelector};
pub use tree::{BspTree, BuildProgress, BuildStats, create_bsp_tree};
pub use visitor::{BspVisitor, CollectingVisitor, FnVisitor, TrianglePointsVisitor};
