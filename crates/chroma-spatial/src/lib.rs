//! Range queries over points in colour space.
//!
//! Every index stores [`ColorPoint`]s inside the cube `[0, 255]³` and answers
//! "which points lie within distance `T` of `q`?", nearest first:
//!
//! - [`LinearIndex`] - exhaustive scan, the reference answer
//! - [`GridHashIndex`] - fixed-size cells, cubic neighbourhood per query
//! - [`AdaptiveGridHashIndex`] - same cells, visited in concentric shells
//! - [`OctreeIndex`] - 3D space partitioning with box pruning
//! - [`QuadtreeIndex`] - 2D partitioning over a [`Plane`], 3D acceptance
//!
//! All of them implement [`RangeIndex`], so a workload can be replayed
//! against each one and the answers compared.
//!
//! # Example
//!
//! ```
//! use chroma_spatial::{ColorPoint, OctreeIndex, RangeIndex, TreeConfig};
//! use glam::Vec3;
//!
//! let mut index = OctreeIndex::new(TreeConfig::default()).unwrap();
//! index.insert(ColorPoint::from_rgb(1, "sky.png", 90, 160, 230));
//! index.insert(ColorPoint::from_rgb(2, "sea.png", 20, 90, 160));
//!
//! let hits = index.query(Vec3::new(88.0, 158.0, 228.0), 10.0);
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].point.id(), 1);
//! ```

mod adaptive_grid;
mod config;
mod error;
mod grid;
mod linear;
mod octree;
mod point;
mod quadtree;
mod region;
mod tree;

pub use adaptive_grid::*;
pub use config::*;
pub use error::*;
pub use grid::*;
pub use linear::*;
pub use octree::*;
pub use point::*;
pub use quadtree::*;
pub use region::*;
pub use tree::*;

use glam::Vec3;

// ============================================================================
// Query contract
// ============================================================================

/// One point returned by a range query, with its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeMatch<'a> {
    /// The indexed point.
    pub point: &'a ColorPoint,
    /// Euclidean distance from the query point.
    pub distance: f32,
}

impl RangeMatch<'_> {
    /// Identity of the matched point.
    pub fn id(&self) -> u64 {
        self.point.id()
    }
}

/// Common contract of every index.
///
/// Indexes are filled by repeated single inserts and then queried any number
/// of times. Queries only read the structure, so a built index can be shared
/// across threads for querying.
pub trait RangeIndex {
    /// Human-readable name including the configuration.
    fn name(&self) -> String;

    /// Adds a point. Never fails.
    fn insert(&mut self, point: ColorPoint);

    /// Returns every point within `threshold` of `query` (inclusive),
    /// sorted nearest first.
    ///
    /// A negative or NaN threshold matches nothing.
    fn query(&self, query: Vec3, threshold: f32) -> Vec<RangeMatch<'_>>;

    /// Number of indexed points.
    fn len(&self) -> usize;

    /// Returns `true` if no point has been inserted.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tests `point` against the query and records it on success.
#[inline]
pub(crate) fn collect_match<'a>(
    point: &'a ColorPoint,
    query: Vec3,
    threshold: f32,
    out: &mut Vec<RangeMatch<'a>>,
) {
    let d = distance(point.position(), query);
    if d <= threshold {
        out.push(RangeMatch { point, distance: d });
    }
}

/// Sorts nearest first. Stable, so equal distances keep visiting order.
pub(crate) fn sort_matches(matches: &mut [RangeMatch<'_>]) {
    matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}

/// Returns `true` if consecutive distances never decrease.
pub fn is_sorted_by_distance(matches: &[RangeMatch<'_>]) -> bool {
    matches.windows(2).all(|w| w[0].distance <= w[1].distance)
}

// ============================================================================
// Tests
// ============================================================================
