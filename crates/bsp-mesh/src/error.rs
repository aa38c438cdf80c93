//! Error types for mesh construction and BSP tree building.

use thiserror::Error;

/// Errors that can occur while building meshes, classifying or splitting
/// triangles, or constructing a BSP tree.
///
/// Every error aborts the operation in progress. Geometry already appended to
/// the [`Mesh`](crate::Mesh) before the failure stays there; callers that need
/// atomicity should build on a scratch mesh and discard it on failure.
#[derive(Debug, Error)]
pub enum BspError {
    /// Input geometry cannot be processed: a non-finite coordinate, a
    /// zero-area triangle used as a plane source, or a non-finite distance.
    #[error("degenerate geometry: {details}")]
    DegenerateGeometry {
        /// Description of the degeneracy.
        details: String,
    },

    /// A classification or split reached a state that a correct
    /// implementation never produces.
    #[error("internal invariant violated: {details}")]
    InternalInvariant {
        /// Description of the violated invariant.
        details: String,
    },

    /// A triangle referenced a position that does not exist.
    #[error("index {index} out of bounds for mesh with {num_positions} positions")]
    IndexOutOfBounds {
        /// The offending index.
        index: u32,
        /// Number of positions in the mesh at the time of the call.
        num_positions: u32,
    },

    /// An operation named a triangle the mesh does not have.
    #[error("triangle {triangle} out of bounds for mesh with {num_triangles} triangles")]
    TriangleOutOfBounds {
        /// The offending triangle index.
        triangle: usize,
        /// Number of triangles in the mesh at the time of the call.
        num_triangles: usize,
    },

    /// Build cancelled by progress callback.
    #[error("operation cancelled")]
    Cancelled,
}

impl BspError {
    pub(crate) fn degenerate(details: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            details: details.into(),
        }
    }

    pub(crate) fn invariant(details: impl Into<String>) -> Self {
        Self::InternalInvariant {
            details: details.into(),
        }
    }
}

/// Result type for mesh and BSP operations.
pub type BspResult<T> = Result<T, BspError>;
