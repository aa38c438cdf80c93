//! BSP tree node implementation.

/// A node in the BSP tree.
///
/// A node is stored under the index of its partition triangle, whose plane
/// splits the node's subtree. `front` and `back` name the partition triangle
/// of each child subtree. A child that is not itself a key of the tree is an
/// implicit leaf: a subtree holding exactly that one triangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BspNode {
    /// Subtree in FRONT of the splitting plane (coplanar triangles included).
    front: Option<usize>,

    /// Subtree BEHIND the splitting plane.
    back: Option<usize>,
}

impl BspNode {
    /// Creates a node with the given children.
    pub fn new(front: Option<usize>, back: Option<usize>) -> Self {
        Self { front, back }
    }

    /// Returns the front child triangle.
    #[inline]
    pub fn front(&self) -> Option<usize> {
        self.front
    }

    /// Returns the back child triangle.
    #[inline]
    pub fn back(&self) -> Option<usize> {
        self.back
    }

    /// Sets the front child triangle.
    #[inline]
    pub fn set_front(&mut self, triangle: Option<usize>) {
        self.front = triangle;
    }

    /// Sets the back child triangle.
    #[inline]
    pub fn set_back(&mut self, triangle: Option<usize>) {
        self.back = triangle;
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }

    /// Iterates over the present children, front first.
    pub fn children(&self) -> impl Iterator<Item = usize> {
        self.front.into_iter().chain(self.back)
    }
}
