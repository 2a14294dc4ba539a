use glam::Vec3;

use crate::tree::SpatialTree;
use crate::{
    Aabb3, ColorPoint, IndexResult, RangeIndex, RangeMatch, TreeConfig, TreeStats, sort_matches,
};

/// An octree over the colour cube.
///
/// A leaf that grows past `max_points_per_node` splits into octants at its
/// midpoint and hands its points down; below `max_depth` this can cascade.
/// Leaves at `max_depth` never split, which keeps piles of identical colours
/// from recursing forever.
///
/// Queries skip every subtree whose box is farther than the threshold from
/// the query point.
///
/// # Example
///
/// ```
/// use chroma_spatial::{ColorPoint, OctreeIndex, RangeIndex, TreeConfig};
/// use glam::Vec3;
///
/// let mut tree = OctreeIndex::new(TreeConfig::new(4, 8)).unwrap();
/// for (id, v) in [0u8, 10, 20, 200].into_iter().enumerate() {
///     tree.insert(ColorPoint::from_rgb(id as u64, "grey", v, v, v));
/// }
///
/// let hits = tree.query(Vec3::ZERO, 20.0);
/// assert_eq!(hits.len(), 2);
/// assert_eq!(hits[0].point.id(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct OctreeIndex {
    tree: SpatialTree<Aabb3>,
}

impl OctreeIndex {
    /// Creates an empty octree over `[0, 255]³`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexError::InvalidCapacity`] or
    /// [`crate::IndexError::InvalidDepth`] for zero parameters.
    pub fn new(config: TreeConfig) -> IndexResult<Self> {
        config.validate()?;
        log::debug!(
            "octree created: max {} points per node, max depth {}",
            config.max_points_per_node,
            config.max_depth
        );
        Ok(Self {
            tree: SpatialTree::new(Aabb3::color_cube(), config),
        })
    }

    /// Capacity and depth ceiling in use.
    pub fn config(&self) -> TreeConfig {
        self.tree.config()
    }

    /// Region covered by the root.
    pub fn bounds(&self) -> Aabb3 {
        self.tree.bounds()
    }

    /// Shape summary.
    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }
}

impl Default for OctreeIndex {
    fn default() -> Self {
        Self {
            tree: SpatialTree::new(Aabb3::color_cube(), TreeConfig::default()),
        }
    }
}

impl RangeIndex for OctreeIndex {
    fn name(&self) -> String {
        let config = self.tree.config();
        format!(
            "Octree (max_per_node={}, max_depth={})",
            config.max_points_per_node, config.max_depth
        )
    }

    fn insert(&mut self, point: ColorPoint) {
        self.tree.insert(point);
    }

    fn query(&self, query: Vec3, threshold: f32) -> Vec<RangeMatch<'_>> {
        let mut matches = Vec::new();
        self.tree.query(query, threshold, &mut matches);
        sort_matches(&mut matches);
        matches
    }

    fn len(&self) -> usize {
        self.tree.len()
    }
}
