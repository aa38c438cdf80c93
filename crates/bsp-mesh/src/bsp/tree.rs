//! BSP tree container and construction.

use std::collections::{BTreeMap, VecDeque};

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::classify::{ClassificationKind, Classifier};
use crate::weld::SplitVertexWelder;
use crate::{BspConfig, BspError, BspResult, Mesh, Plane3D, PlaneSide};

use super::node::BspNode;
use super::selector::{FirstTriangle, PlaneSelector};
use super::visitor::BspVisitor;

/// Counters collected while building a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Triangles in the mesh when the build started.
    pub input_triangles: usize,
    /// Straddling triangles that were split.
    pub splits: usize,
    /// Triangles appended to the mesh by splitting.
    pub created_triangles: usize,
    /// Split vertices resolved to an existing vertex by welding.
    pub welded_vertices: usize,
}

/// Snapshot handed to a progress callback before each worklist step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildProgress {
    /// Partition triangles processed so far.
    pub processed: usize,
    /// Partition triangles waiting in the worklist, including the next one.
    pub queued: usize,
    /// Triangles currently in the mesh.
    pub mesh_triangles: usize,
}

/// A Binary Space Partitioning tree over the triangles of a [`Mesh`].
///
/// The tree owns no geometry. It maps the index of each partition triangle
/// to a [`BspNode`] naming the partition triangles of its front and back
/// subtrees; a child index that is not a key is a single-triangle leaf.
/// Indices may refer to triangles that splitting appended to the mesh, so a
/// tree is only meaningful together with the mesh it was built on.
///
/// # Construction
///
/// Construction runs an explicit FIFO worklist of `(partition, pending)`
/// tasks instead of recursing, so stack usage stays constant however deep
/// the tree grows:
///
/// ```
/// use bsp_mesh::{BspTree, Mesh};
///
/// let mut mesh = Mesh::from_triangles([
///     [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0]],
///     [[0.0, 0.0, 10.0], [10.0, 0.0, 10.0], [10.0, 10.0, 10.0]],
/// ])?;
/// let tree = BspTree::build(&mut mesh)?;
/// assert_eq!(tree.root(), Some(0));
/// assert_eq!(tree.node(0).and_then(|n| n.front()), Some(1));
/// # Ok::<(), bsp_mesh::BspError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct BspTree {
    root: Option<usize>,
    nodes: BTreeMap<usize, BspNode>,
    stats: BuildStats,
}

impl BspTree {
    /// Creates an empty BSP tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree over every triangle of `mesh` with default tolerances.
    ///
    /// Straddling triangles are split, which appends vertices and triangles
    /// to `mesh`. Returns an empty tree for an empty mesh.
    pub fn build(mesh: &mut Mesh) -> BspResult<Self> {
        Self::build_with_config(mesh, &BspConfig::default())
    }

    /// Builds a tree with the given tolerances.
    pub fn build_with_config(mesh: &mut Mesh, config: &BspConfig) -> BspResult<Self> {
        Self::build_with_selector(mesh, config, &FirstTriangle)
    }

    /// Builds a tree choosing partitions with `selector`.
    pub fn build_with_selector<S: PlaneSelector>(
        mesh: &mut Mesh,
        config: &BspConfig,
        selector: &S,
    ) -> BspResult<Self> {
        Builder::new(mesh, config, selector).run(|_| true)
    }

    /// Builds a tree, calling `progress` before each worklist step.
    ///
    /// Returning `false` from the callback aborts the build with
    /// [`BspError::Cancelled`]. Triangles split before the abort stay in the
    /// mesh.
    pub fn build_with_progress<F>(mesh: &mut Mesh, config: &BspConfig, progress: F) -> BspResult<Self>
    where
        F: FnMut(BuildProgress) -> bool,
    {
        Builder::new(mesh, config, &FirstTriangle).run(progress)
    }

    /// Returns `true` if the tree contains no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the root partition triangle, if any.
    #[inline]
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    /// Returns the node stored under `triangle`, if it is a partition.
    #[inline]
    pub fn node(&self, triangle: usize) -> Option<&BspNode> {
        self.nodes.get(&triangle)
    }

    /// Returns `true` if `triangle` is a partition of this tree.
    #[inline]
    pub fn contains_node(&self, triangle: usize) -> bool {
        self.nodes.contains_key(&triangle)
    }

    /// The node map, ordered by triangle index.
    #[inline]
    pub fn nodes(&self) -> &BTreeMap<usize, BspNode> {
        &self.nodes
    }

    /// Number of partition nodes (keys of the node map).
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Alias for [`node_count`](Self::node_count).
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Counters from construction.
    #[inline]
    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Returns every triangle held by the tree, partitions and implicit
    /// leaves, in breadth-first order.
    pub fn triangles(&self) -> Vec<usize> {
        let mut result = Vec::with_capacity(self.nodes.len() * 2);
        let mut queue: VecDeque<usize> = self.root.into_iter().collect();
        while let Some(triangle) = queue.pop_front() {
            result.push(triangle);
            if let Some(node) = self.nodes.get(&triangle) {
                queue.extend(node.children());
            }
        }
        result
    }

    /// Returns the total number of triangles held by the tree.
    pub fn triangle_count(&self) -> usize {
        let leaves = self
            .nodes
            .values()
            .flat_map(BspNode::children)
            .filter(|child| !self.nodes.contains_key(child))
            .count();
        self.root.map_or(0, |_| self.nodes.len() + leaves)
    }

    /// Returns the maximum depth of the tree (0 for empty tree), counting
    /// implicit leaves as a level.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((triangle, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some(node) = self.nodes.get(&triangle) {
                stack.extend(node.children().map(|child| (child, depth + 1)));
            }
        }
        deepest
    }

    /// Traverses the tree front-to-back relative to the given viewpoint.
    ///
    /// Triangles nearer to `eye` are visited first. Partition planes are
    /// rederived from `mesh`, which must be the mesh the tree was built on.
    pub fn traverse_front_to_back<V: BspVisitor>(
        &self,
        mesh: &Mesh,
        eye: Point3<f64>,
        visitor: &mut V,
    ) -> BspResult<()> {
        self.traverse(mesh, eye, visitor, true)
    }

    /// Traverses the tree back-to-front relative to the given viewpoint.
    ///
    /// This is painter's-algorithm order: farther triangles first.
    pub fn traverse_back_to_front<V: BspVisitor>(
        &self,
        mesh: &Mesh,
        eye: Point3<f64>,
        visitor: &mut V,
    ) -> BspResult<()> {
        self.traverse(mesh, eye, visitor, false)
    }

    fn traverse<V: BspVisitor>(
        &self,
        mesh: &Mesh,
        eye: Point3<f64>,
        visitor: &mut V,
        front_to_back: bool,
    ) -> BspResult<()> {
        enum Step {
            Enter(usize),
            Emit(usize),
        }

        let mut stack: Vec<Step> = self.root.map(Step::Enter).into_iter().collect();
        while let Some(step) = stack.pop() {
            let triangle = match step {
                Step::Emit(triangle) => {
                    visitor.visit(mesh, triangle);
                    continue;
                }
                Step::Enter(triangle) => triangle,
            };
            let Some(node) = self.nodes.get(&triangle) else {
                visitor.visit(mesh, triangle);
                continue;
            };

            let plane = Plane3D::from_triangle(mesh, triangle)?;
            let eye_in_back = plane.classify_point(&eye) == PlaneSide::Back;
            // The subtree on the eye's side is the near one.
            let (near, far) = if eye_in_back {
                (node.back(), node.front())
            } else {
                (node.front(), node.back())
            };
            let (first, last) = if front_to_back { (near, far) } else { (far, near) };

            // Pushed in reverse: `first` is popped next.
            stack.extend(last.map(Step::Enter));
            stack.push(Step::Emit(triangle));
            stack.extend(first.map(Step::Enter));
        }
        Ok(())
    }
}

/// Builds a tree over `mesh` with default tolerances.
///
/// Equivalent to [`BspTree::build`].
pub fn create_bsp_tree(mesh: &mut Mesh) -> BspResult<BspTree> {
    BspTree::build(mesh)
}

/// Worklist state for one tree construction.
struct Builder<'a, S> {
    mesh: &'a mut Mesh,
    selector: &'a S,
    classifier: Classifier,
    welder: SplitVertexWelder,
    queue: VecDeque<(usize, Vec<usize>)>,
    nodes: BTreeMap<usize, BspNode>,
    stats: BuildStats,
}

impl<'a, S: PlaneSelector> Builder<'a, S> {
    fn new(mesh: &'a mut Mesh, config: &BspConfig, selector: &'a S) -> Self {
        Self {
            selector,
            classifier: Classifier::new(*config),
            welder: SplitVertexWelder::new(config.weld_tolerance),
            queue: VecDeque::new(),
            nodes: BTreeMap::new(),
            stats: BuildStats {
                input_triangles: mesh.num_triangles(),
                ..BuildStats::default()
            },
            mesh,
        }
    }

    fn run<F>(mut self, mut progress: F) -> BspResult<BspTree>
    where
        F: FnMut(BuildProgress) -> bool,
    {
        let input = self.stats.input_triangles;
        info!(triangles = input, "Building BSP tree");

        // The root is always a node, even for a single triangle.
        let root = self.choose((0..input).collect()).map(|(partition, pending)| {
            self.queue.push_back((partition, pending));
            partition
        });
        let mut processed = 0;

        while let Some((partition, pending)) = self.queue.pop_front() {
            let snapshot = BuildProgress {
                processed,
                queued: self.queue.len() + 1,
                mesh_triangles: self.mesh.num_triangles(),
            };
            if !progress(snapshot) {
                warn!(processed, "BSP build cancelled");
                return Err(BspError::Cancelled);
            }

            let (front, back) = self.partition(partition, pending)?;
            let node = BspNode::new(self.enqueue(front), self.enqueue(back));
            self.nodes.insert(partition, node);
            processed += 1;
        }

        self.stats.welded_vertices = self.welder.merged();
        info!(
            triangles = input,
            nodes = self.nodes.len(),
            splits = self.stats.splits,
            created = self.stats.created_triangles,
            "Built BSP tree"
        );

        Ok(BspTree {
            root,
            nodes: self.nodes,
            stats: self.stats,
        })
    }

    /// Sorts `pending` into the front and back half-spaces of `partition`'s
    /// plane, splitting straddlers.
    fn partition(
        &mut self,
        partition: usize,
        pending: Vec<usize>,
    ) -> BspResult<(Vec<usize>, Vec<usize>)> {
        let plane = Plane3D::from_triangle(&*self.mesh, partition)?;
        let mut front = Vec::new();
        let mut back = Vec::new();

        for triangle in pending {
            let classification = self.classifier.classify(&plane, &*self.mesh, triangle)?;
            let split = match classification.kind() {
                ClassificationKind::SplitOneCoplanar => plane.split_polygon_one_coplanar_with(
                    &mut *self.mesh,
                    &classification,
                    &mut self.welder,
                )?,
                ClassificationKind::SplitNoneCoplanar => plane.split_polygon_none_coplanar_with(
                    &mut *self.mesh,
                    &classification,
                    &mut self.welder,
                )?,
                kind => {
                    match kind.side() {
                        Some(PlaneSide::Back) => back.push(triangle),
                        _ => front.push(triangle),
                    }
                    continue;
                }
            };

            self.stats.splits += 1;
            self.stats.created_triangles += split.len();
            front.extend(split.front.iter().map(|t| t.index));
            back.extend(split.back.iter().map(|t| t.index));
        }

        debug!(
            partition,
            front = front.len(),
            back = back.len(),
            "Partitioned triangles"
        );
        Ok((front, back))
    }

    /// Turns a half-space list into a child reference, queueing a task when
    /// more than one triangle remains to be ordered.
    fn enqueue(&mut self, triangles: Vec<usize>) -> Option<usize> {
        if let [single] = triangles[..] {
            return Some(single);
        }
        let (partition, pending) = self.choose(triangles)?;
        self.queue.push_back((partition, pending));
        Some(partition)
    }

    /// Removes the selector's partition from `triangles`.
    fn choose(&self, mut triangles: Vec<usize>) -> Option<(usize, Vec<usize>)> {
        if triangles.is_empty() {
            return None;
        }
        let chosen = self
            .selector
            .select(&*self.mesh, &triangles)
            .filter(|&i| i < triangles.len())
            .unwrap_or(0);
        let partition = triangles.remove(chosen);
        Some((partition, triangles))
    }
}
