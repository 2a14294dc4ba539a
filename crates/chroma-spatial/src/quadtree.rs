use glam::Vec3;

use crate::tree::SpatialTree;
use crate::{
    ColorPoint, IndexResult, Plane, PlaneRect, RangeIndex, RangeMatch, TreeConfig, TreeStats,
    sort_matches,
};

/// A quadtree over two of the three colour axes.
///
/// Nodes split a [`PlaneRect`] into quadrants and ignore the third axis, so
/// each leaf holds a whole column of the cube. Pruning only sees the two
/// structured axes and can keep nodes a full 3D test would drop; every
/// candidate still passes the exact 3D distance test, so the result set is
/// the same as an exhaustive scan. The tree is shallower and cheaper to
/// build than an octree in exchange.
///
/// # Example
///
/// ```
/// use chroma_spatial::{ColorPoint, Plane, QuadtreeIndex, RangeIndex, TreeConfig};
/// use glam::Vec3;
///
/// let mut tree = QuadtreeIndex::with_plane(TreeConfig::quadtree(), Plane::Xy).unwrap();
/// tree.insert(ColorPoint::from_rgb(1, "dark red", 100, 0, 0));
/// tree.insert(ColorPoint::from_rgb(2, "bright red", 100, 0, 250));
///
/// // Same red/green column, only the blue channel tells them apart
/// let hits = tree.query(Vec3::new(100.0, 0.0, 0.0), 10.0);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].point.id(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct QuadtreeIndex {
    tree: SpatialTree<PlaneRect>,
}

impl QuadtreeIndex {
    /// Creates an empty quadtree on the red/green plane.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexError::InvalidCapacity`] or
    /// [`crate::IndexError::InvalidDepth`] for zero parameters.
    pub fn new(config: TreeConfig) -> IndexResult<Self> {
        Self::with_plane(config, Plane::default())
    }

    /// Creates an empty quadtree partitioning the axes of `plane`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn with_plane(config: TreeConfig, plane: Plane) -> IndexResult<Self> {
        config.validate()?;
        log::debug!(
            "quadtree created on {} plane: max {} points per node, max depth {}",
            plane.axes(),
            config.max_points_per_node,
            config.max_depth
        );
        Ok(Self {
            tree: SpatialTree::new(PlaneRect::color_square(plane), config),
        })
    }

    /// Structured axes.
    pub fn plane(&self) -> Plane {
        self.tree.bounds().plane
    }

    /// Capacity and depth ceiling in use.
    pub fn config(&self) -> TreeConfig {
        self.tree.config()
    }

    /// Shape summary.
    pub fn stats(&self) -> TreeStats {
        self.tree.stats()
    }
}

impl Default for QuadtreeIndex {
    fn default() -> Self {
        Self {
            tree: SpatialTree::new(
                PlaneRect::color_square(Plane::default()),
                TreeConfig::quadtree(),
            ),
        }
    }
}

impl RangeIndex for QuadtreeIndex {
    fn name(&self) -> String {
        let config = self.tree.config();
        format!(
            "Quadtree (plane={}, max_per_node={}, max_depth={})",
            self.plane().axes(),
            config.max_points_per_node,
            config.max_depth
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexError;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rejects_bad_config() {
        assert_eq!(
            QuadtreeIndex::new(TreeConfig::new(0, 10)).unwrap_err(),
            IndexError::InvalidCapacity(0)
        );
        assert!(QuadtreeIndex::with_plane(TreeConfig::new(1, 0), Plane::Yz).is_err());
    }

    #[test]
    fn test_third_axis_does_not_split() {
        let config = TreeConfig::new(2, 4);
        let mut tree = QuadtreeIndex::new(config).unwrap();
        // Same red/green, spread over blue: one column, splits cannot help
        for b in 0..20u8 {
            tree.insert(ColorPoint::from_rgb(u64::from(b), "col", 40, 40, b * 12));
        }
        let stats = tree.stats();
        assert_eq!(stats.max_depth, config.max_depth);

        let leaves: Vec<_> = tree.tree.leaves().filter(|(_, _, p)| !p.is_empty()).collect();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].1, config.max_depth);
        assert_eq!(leaves[0].2.len(), 20);
    }

    #[test]
    fn test_capacity_invariant() {
        let config = TreeConfig::new(5, 6);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut tree = QuadtreeIndex::with_plane(config, Plane::Xz).unwrap();
        for i in 0..1500u64 {
            let [r, g, b] = rng.random::<[u8; 3]>();
            tree.insert(ColorPoint::from_rgb(i, "p", r, g, b));
        }
        // Shared red/blue column, only green differs
        for g in 0..40u8 {
            tree.insert(ColorPoint::from_rgb(5000 + u64::from(g), "col", 9, g, 9));
        }
        assert_eq!(tree.len(), 1540);

        let mut total = 0;
        for (region, depth, points) in tree.tree.leaves() {
            assert!(
                points.len() <= config.max_points_per_node || depth == config.max_depth,
                "leaf at depth {depth} holds {} points",
                points.len()
            );
            for p in points {
                assert!(region.contains_point(p.position()));
            }
            total += points.len();
        }
        assert_eq!(total, 1540);
        assert_eq!(tree.stats().max_depth, config.max_depth);
    }

    #[test]
    fn test_full_distance_filters_column() {
        let mut tree = QuadtreeIndex::new(TreeConfig::new(1, 6)).unwrap();
        tree.insert(ColorPoint::from_rgb(1, "low", 50, 50, 0));
        tree.insert(ColorPoint::from_rgb(2, "mid", 50, 50, 100));
        tree.insert(ColorPoint::from_rgb(3, "high", 50, 50, 255));

        let hits = tree.query(Vec3::new(50.0, 50.0, 90.0), 20.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), 2);
        assert_eq!(hits[0].distance, 10.0);
    }

    #[test]
    fn test_planes_agree() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let points: Vec<_> = (0..300u64)
            .map(|i| {
                let [r, g, b] = rng.random::<[u8; 3]>();
                ColorPoint::from_rgb(i, "p", r, g, b)
            })
            .collect();
        let q = Vec3::new(30.0, 220.0, 128.0);

        let mut answers = Vec::new();
        for plane in [Plane::Xy, Plane::Xz, Plane::Yz] {
            let mut tree = QuadtreeIndex::with_plane(TreeConfig::new(4, 10), plane).unwrap();
            for p in points.iter().cloned() {
                tree.insert(p);
            }
            assert_eq!(tree.plane(), plane);
            let mut ids: Vec<_> = tree.query(q, 90.0).iter().map(RangeMatch::id).collect();
            ids.sort_unstable();
            answers.push(ids);
        }
        assert!(!answers[0].is_empty());
        assert_eq!(answers[0], answers[1]);
        assert_eq!(answers[1], answers[2]);
    }

    #[test]
    fn test_default_config() {
        let tree = QuadtreeIndex::default();
        assert_eq!(tree.config(), TreeConfig::quadtree());
        assert_eq!(tree.plane(), Plane::Xy);
        assert_eq!(
            tree.name(),
            "Quadtree (plane=xy, max_per_node=25, max_depth=10)"
        );
    }
}
