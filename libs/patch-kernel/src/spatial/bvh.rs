//! Bounding volume hierarchy over UV triangles.

use super::{collect_uv_triangles, UvTriangle};
use crate::geometry::UvBox;
use crate::mesh::Mesh;
use config::settings::KernelConfig;
use glam::{DVec2, DVec3};
use tracing::debug;

/// BVH node containing either leaf triangles or child nodes.
#[derive(Debug, Clone)]
pub enum BvhNode {
    /// Leaf node holding triangle indices.
    Leaf {
        /// Bounds of all triangles in this leaf.
        bounds: UvBox,
        /// Indices into [`Bvh::triangles`].
        triangles: Vec<usize>,
    },
    /// Internal node with two children.
    Internal {
        /// Bounds of all triangles in this subtree.
        bounds: UvBox,
        /// Triangles whose centre lies below the split.
        left: Box<Self>,
        /// Triangles whose centre lies at or above the split.
        right: Box<Self>,
    },
}

impl BvhNode {
    /// Bounds of this node.
    pub fn bounds(&self) -> &UvBox {
        match self {
            Self::Leaf { bounds, .. } | Self::Internal { bounds, .. } => bounds,
        }
    }

    fn depth(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

/// Bounding volume hierarchy over a mesh's UV fan triangles.
///
/// Built fresh per embedding; read-only afterwards.
#[derive(Debug, Clone)]
pub struct Bvh {
    triangles: Vec<UvTriangle>,
    root: Option<BvhNode>,
    epsilon: f64,
}

impl Bvh {
    /// Builds the hierarchy over every face of `mesh`.
    ///
    /// Faces with fewer than three corners or unknown UV are skipped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use patch_kernel::{Face, Mesh};
    /// use patch_kernel::spatial::Bvh;
    /// use config::settings::KernelConfig;
    /// use glam::{DVec2, DVec3};
    ///
    /// let mut mesh = Mesh::new("tri");
    /// mesh.add_vertex(DVec2::new(0.0, 0.0), DVec3::new(0.0, 0.0, 0.0));
    /// mesh.add_vertex(DVec2::new(1.0, 0.0), DVec3::new(10.0, 0.0, 0.0));
    /// mesh.add_vertex(DVec2::new(0.0, 1.0), DVec3::new(0.0, 10.0, 0.0));
    /// mesh.add_face(Face::from_raw([0, 1, 2]));
    ///
    /// let bvh = Bvh::build(&mesh, &KernelConfig::default());
    /// let p = bvh.lift_uv_to_xyz(DVec2::new(0.25, 0.25)).unwrap();
    /// assert!((p - DVec3::new(2.5, 2.5, 0.0)).length() < 1e-9);
    /// assert!(bvh.lift_uv_to_xyz(DVec2::new(0.9, 0.9)).is_none());
    /// ```
    pub fn build(mesh: &Mesh, config: &KernelConfig) -> Self {
        let triangles = collect_uv_triangles(mesh, 0..mesh.face_count());
        Self::from_triangles(triangles, config)
    }

    /// Builds the hierarchy over prepared triangles.
    pub fn from_triangles(triangles: Vec<UvTriangle>, config: &KernelConfig) -> Self {
        let root = if triangles.is_empty() {
            None
        } else {
            let indices: Vec<usize> = (0..triangles.len()).collect();
            Some(build_recursive(
                &triangles,
                indices,
                0,
                config.bvh_max_leaf_triangles.max(1),
                config.bvh_max_depth,
            ))
        };

        let bvh = Self {
            triangles,
            root,
            epsilon: config.containment_epsilon,
        };
        debug!(
            "Built UV BVH: {} triangles, depth {}, {} leaves",
            bvh.triangle_count(),
            bvh.depth(),
            bvh.leaf_count()
        );
        bvh
    }

    /// Indexed triangles.
    pub fn triangles(&self) -> &[UvTriangle] {
        &self.triangles
    }

    /// Number of indexed triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Root node; `None` when nothing was indexed.
    pub fn root(&self) -> Option<&BvhNode> {
        self.root.as_ref()
    }

    /// Depth of the tree (a single leaf has depth 0).
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, BvhNode::depth)
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.root.as_ref().map_or(0, BvhNode::leaf_count)
    }

    /// All triangles containing `p`.
    pub fn query(&self, p: DVec2) -> Vec<&UvTriangle> {
        let mut hits = Vec::new();
        if let Some(root) = &self.root {
            self.query_node(root, p, &mut hits);
        }
        hits
    }

    fn query_node<'a>(&'a self, node: &BvhNode, p: DVec2, hits: &mut Vec<&'a UvTriangle>) {
        if !node.bounds().contains(p, self.epsilon) {
            return;
        }
        match node {
            BvhNode::Leaf { triangles, .. } => {
                hits.extend(
                    triangles
                        .iter()
                        .map(|&i| &self.triangles[i])
                        .filter(|t| t.contains(p, self.epsilon)),
                );
            }
            BvhNode::Internal { left, right, .. } => {
                self.query_node(left, p, hits);
                self.query_node(right, p, hits);
            }
        }
    }

    /// Maps a UV point to the surface. `None` when no triangle contains it.
    pub fn lift_uv_to_xyz(&self, p: DVec2) -> Option<DVec3> {
        self.query(p).into_iter().find_map(|t| t.lift(p))
    }
}

fn build_recursive(
    triangles: &[UvTriangle],
    indices: Vec<usize>,
    depth: usize,
    max_leaf: usize,
    max_depth: usize,
) -> BvhNode {
    let mut bounds = UvBox::empty();
    for &i in &indices {
        bounds.union(&triangles[i].bounds);
    }

    if indices.len() <= max_leaf || depth >= max_depth {
        return BvhNode::Leaf {
            bounds,
            triangles: indices,
        };
    }

    // Midpoint split along the longest axis
    let axis = bounds.longest_axis();
    let mid = bounds.center()[axis];
    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| triangles[i].bounds.center()[axis] < mid);

    if left.is_empty() || right.is_empty() {
        return BvhNode::Leaf {
            bounds,
            triangles: indices,
        };
    }

    BvhNode::Internal {
        bounds,
        left: Box::new(build_recursive(triangles, left, depth + 1, max_leaf, max_depth)),
        right: Box::new(build_recursive(triangles, right, depth + 1, max_leaf, max_depth)),
    }
}
