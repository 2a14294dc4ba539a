//! Capacity-split space-partitioning tree shared by the octree and quadtree.
//!
//! Nodes live in a flat arena and refer to their children by index. Insert,
//! redistribution and search all run on explicit worklists, so native stack
//! usage does not grow with tree depth.

use std::fmt;

use glam::Vec3;

use crate::region::Region;
use crate::{ColorPoint, RangeMatch, TreeConfig, collect_match};

const ROOT: usize = 0;

#[derive(Debug, Clone)]
enum NodeKind<R: Region> {
    /// Unordered points. May exceed capacity only at the depth ceiling.
    Leaf(Vec<ColorPoint>),
    /// Child slots, materialised on first use. Never turns back into a leaf.
    Internal(R::Children),
}

#[derive(Debug, Clone)]
struct Node<R: Region> {
    region: R,
    depth: usize,
    kind: NodeKind<R>,
}

impl<R: Region> Node<R> {
    fn leaf(region: R, depth: usize) -> Self {
        Self {
            region,
            depth,
            kind: NodeKind::Leaf(Vec::new()),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SpatialTree<R: Region> {
    nodes: Vec<Node<R>>,
    config: TreeConfig,
    len: usize,
}

impl<R: Region> SpatialTree<R> {
    /// Creates a tree whose root covers `bounds`. `config` must be valid.
    pub(crate) fn new(bounds: R, config: TreeConfig) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid tree config {config:?}");
        Self {
            nodes: vec![Node::leaf(bounds, 0)],
            config,
            len: 0,
        }
    }

    pub(crate) fn config(&self) -> TreeConfig {
        self.config
    }

    pub(crate) fn bounds(&self) -> R {
        self.nodes[ROOT].region
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn insert(&mut self, point: ColorPoint) {
        self.len += 1;

        // Points waiting to be placed, each with the node to start from
        let mut pending = vec![(ROOT, point)];
        while let Some((start, point)) = pending.pop() {
            let leaf = self.descend(start, point.position());
            let node = &mut self.nodes[leaf];
            let NodeKind::Leaf(points) = &mut node.kind else {
                continue;
            };
            points.push(point);
            if points.len() <= self.config.max_points_per_node || node.depth >= self.config.max_depth
            {
                continue;
            }

            let overflow = std::mem::take(points);
            log::debug!(
                "splitting node {leaf} at depth {} ({} points)",
                node.depth,
                overflow.len()
            );
            node.kind = NodeKind::Internal(R::Children::default());
            // Reversed so the stack hands them out in their original order
            pending.extend(overflow.into_iter().rev().map(|p| (leaf, p)));
        }
    }

    /// Walks from `start` to the leaf that owns `position`, creating missing
    /// children on the way.
    fn descend(&mut self, start: usize, position: Vec3) -> usize {
        let mut id = start;
        loop {
            let node = &self.nodes[id];
            let NodeKind::Internal(children) = &node.kind else {
                return id;
            };
            let slot = node.region.child_index(position);
            let existing = children.as_ref()[slot];
            id = match existing {
                Some(child) => child,
                None => {
                    let child = Node::leaf(node.region.child(slot), node.depth + 1);
                    self.attach(id, slot, child)
                }
            };
        }
    }

    fn attach(&mut self, parent: usize, slot: usize, child: Node<R>) -> usize {
        let child_id = self.nodes.len();
        self.nodes.push(child);
        if let NodeKind::Internal(children) = &mut self.nodes[parent].kind {
            children.as_mut()[slot] = Some(child_id);
        }
        child_id
    }

    /// Depth-first search with region pruning. Appends unsorted matches.
    pub(crate) fn query<'a>(&'a self, query: Vec3, threshold: f32, out: &mut Vec<RangeMatch<'a>>) {
        let mut visited = 0usize;
        let mut pruned = 0usize;
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.region.min_distance(query) > threshold {
                pruned += 1;
                continue;
            }
            visited += 1;
            match &node.kind {
                NodeKind::Leaf(points) => {
                    for point in points {
                        collect_match(point, query, threshold, out);
                    }
                }
                NodeKind::Internal(children) => {
                    stack.extend(children.as_ref().iter().rev().flatten());
                }
            }
        }
        log::trace!(
            "tree query visited {visited} nodes, pruned {pruned}, {} matches",
            out.len()
        );
    }

    pub(crate) fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            points: self.len,
            ..TreeStats::default()
        };
        for node in &self.nodes {
            match node.kind {
                NodeKind::Leaf(_) => stats.leaf_nodes += 1,
                NodeKind::Internal(_) => stats.internal_nodes += 1,
            }
            stats.max_depth = stats.max_depth.max(node.depth);
        }
        stats.mean_per_leaf = self.len as f32 / stats.leaf_nodes as f32;
        stats
    }

    /// Every leaf as `(region, depth, points)`.
    #[cfg(test)]
    pub(crate) fn leaves(&self) -> impl Iterator<Item = (R, usize, &[ColorPoint])> {
        self.nodes.iter().filter_map(|node| match &node.kind {
            NodeKind::Leaf(points) => Some((node.region, node.depth, points.as_slice())),
            NodeKind::Internal(_) => None,
        })
    }
}

/// Shape summary of an octree or quadtree.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TreeStats {
    /// Stored points.
    pub points: usize,
    /// Materialised leaf nodes.
    pub leaf_nodes: usize,
    /// Internal nodes.
    pub internal_nodes: usize,
    /// Depth of the deepest node (root is 0).
    pub max_depth: usize,
    /// Average points per leaf.
    pub mean_per_leaf: f32,
}

impl TreeStats {
    /// Leaf plus internal nodes.
    pub fn total_nodes(&self) -> usize {
        self.leaf_nodes + self.internal_nodes
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} points, {} nodes ({} leaves, {} internal), depth {}, {:.2} points/leaf",
            self.points,
            self.total_nodes(),
            self.leaf_nodes,
            self.internal_nodes,
            self.max_depth,
            self.mean_per_leaf
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Aabb3;

    fn tree(max_points: usize, max_depth: usize) -> SpatialTree<Aabb3> {
        SpatialTree::new(Aabb3::color_cube(), TreeConfig::new(max_points, max_depth))
    }

    #[test]
    fn test_root_starts_as_empty_leaf() {
        let tree = tree(4, 8);
        let stats = tree.stats();
        assert_eq!(stats.leaf_nodes, 1);
        assert_eq!(stats.internal_nodes, 0);
        assert_eq!(stats.max_depth, 0);
        assert_eq!(stats.mean_per_leaf, 0.0);
    }

    #[test]
    fn test_split_is_lazy() {
        let mut tree = tree(2, 8);
        tree.insert(ColorPoint::from_rgb(1, "a", 10, 10, 10));
        tree.insert(ColorPoint::from_rgb(2, "b", 10, 10, 200));
        assert_eq!(tree.stats().internal_nodes, 0);

        tree.insert(ColorPoint::from_rgb(3, "c", 200, 10, 10));
        let stats = tree.stats();
        assert_eq!(stats.internal_nodes, 1);
        // Only the three occupied octants were materialised
        assert_eq!(stats.leaf_nodes, 3);
        assert_eq!(stats.max_depth, 1);
    }

    #[test]
    fn test_cascade_split() {
        let mut tree = tree(1, 8);
        // Both in octant 0 of the root, separated one level down
        tree.insert(ColorPoint::from_rgb(1, "a", 1, 1, 1));
        tree.insert(ColorPoint::from_rgb(2, "b", 100, 100, 100));
        let stats = tree.stats();
        assert_eq!(stats.internal_nodes, 2);
        assert_eq!(stats.leaf_nodes, 2);
        assert_eq!(stats.max_depth, 2);
        for (region, _, points) in tree.leaves() {
            assert_eq!(points.len(), 1);
            assert!(region.contains_point(points[0].position()));
        }
    }

    #[test]
    fn test_coincident_points_stop_at_depth_ceiling() {
        let mut tree = tree(2, 3);
        for id in 0..50 {
            tree.insert(ColorPoint::from_rgb(id, "dup", 7, 7, 7));
        }
        let stats = tree.stats();
        assert_eq!(stats.points, 50);
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.internal_nodes, 3);

        let (_, depth, points) = tree.leaves().next().unwrap();
        assert_eq!(depth, 3);
        assert_eq!(points.len(), 50);
    }

    #[test]
    fn test_query_prunes_and_collects() {
        let mut tree = tree(1, 8);
        tree.insert(ColorPoint::from_rgb(1, "a", 0, 0, 0));
        tree.insert(ColorPoint::from_rgb(2, "b", 255, 255, 255));
        tree.insert(ColorPoint::from_rgb(3, "c", 3, 4, 0));

        let mut out = Vec::new();
        tree.query(Vec3::ZERO, 5.0, &mut out);
        let mut ids: Vec<_> = out.iter().map(RangeMatch::id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_leaf_order_follows_insertion() {
        let mut tree = tree(3, 8);
        for id in 0..4 {
            tree.insert(ColorPoint::from_rgb(id, "p", 10, 10, 10));
        }
        let (_, _, points) = tree.leaves().find(|(_, _, p)| !p.is_empty()).unwrap();
        let ids: Vec<_> = points.iter().map(ColorPoint::id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_stats_display() {
        let mut tree = tree(4, 8);
        tree.insert(ColorPoint::from_rgb(1, "a", 0, 0, 0));
        assert_eq!(
            tree.stats().to_string(),
            "1 points, 1 nodes (1 leaves, 0 internal), depth 0, 1.00 points/leaf"
        );
    }
}
