//! Uniform-cell spatial hashing.

use std::collections::HashMap;
use std::fmt;

use glam::{I64Vec3, IVec3, Vec3};

use crate::{
    ColorPoint, GridConfig, IndexResult, RangeIndex, RangeMatch, collect_match, sort_matches,
};

/// Relative padding on a query's reach. Far larger than the few ulps of
/// error in the distance and bound arithmetic.
const REACH_SLACK: f32 = 1e-5;

/// Buckets of points keyed by the integer cell that contains them.
///
/// Shared by [`GridHashIndex`] and [`crate::AdaptiveGridHashIndex`], which
/// only differ in the order they visit cells.
#[derive(Debug, Clone)]
pub(crate) struct CellGrid {
    cell_size: f32,
    cells: HashMap<IVec3, Vec<ColorPoint>>,
    len: usize,
    // Bounding box of occupied keys. Inverted while empty.
    key_min: IVec3,
    key_max: IVec3,
}

impl CellGrid {
    pub(crate) fn new(config: GridConfig) -> IndexResult<Self> {
        config.validate()?;
        Ok(Self::empty(config.cell_size))
    }

    fn empty(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            len: 0,
            key_min: IVec3::MAX,
            key_max: IVec3::MIN,
        }
    }

    /// Grid with the cell size of `config`, which must already be valid.
    pub(crate) fn with_valid_config(config: GridConfig) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid grid config {config:?}");
        Self::empty(config.cell_size)
    }

    pub(crate) fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// `floor(position / cell_size)` per axis. Used for both insert and
    /// query so a point always maps to the same cell.
    pub(crate) fn cell_key(&self, position: Vec3) -> IVec3 {
        (position / self.cell_size).floor().as_ivec3()
    }

    pub(crate) fn insert(&mut self, point: ColorPoint) {
        let key = self.cell_key(point.position());
        self.key_min = self.key_min.min(key);
        self.key_max = self.key_max.max(key);
        self.cells.entry(key).or_default().push(point);
        self.len += 1;
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Inclusive box of cell keys that can hold a match for `query` within
    /// `threshold`, clipped to the occupied cells. `None` when nothing can
    /// match.
    ///
    /// The reach is padded past `threshold` so that a point accepted by the
    /// rounded distance test always falls inside, even when the query sits a
    /// few ulps from a cell boundary.
    pub(crate) fn search_box(&self, query: Vec3, threshold: f32) -> Option<(I64Vec3, I64Vec3)> {
        if threshold.is_nan() || threshold < 0.0 || query.is_nan() {
            return None;
        }
        let (occupied_min, occupied_max) = self.occupied()?;
        let reach = Vec3::splat(threshold) + (query.abs() + threshold) * REACH_SLACK;
        // `cell_key` is monotone, so keys of the padded bounds enclose every
        // key in between; the extra cell absorbs the division rounding.
        let lo = (self.cell_key(query - reach).as_i64vec3() - I64Vec3::ONE).max(occupied_min);
        let hi = (self.cell_key(query + reach).as_i64vec3() + I64Vec3::ONE).min(occupied_max);
        if lo.cmpgt(hi).any() {
            None
        } else {
            Some((lo, hi))
        }
    }

    /// Inclusive box of occupied cell keys, `None` while empty.
    pub(crate) fn occupied(&self) -> Option<(I64Vec3, I64Vec3)> {
        if self.len == 0 {
            None
        } else {
            Some((self.key_min.as_i64vec3(), self.key_max.as_i64vec3()))
        }
    }

    /// Tests every point of one cell. Returns the number of candidates.
    ///
    /// `key` must lie inside [`Self::occupied`].
    pub(crate) fn scan_cell<'a>(
        &'a self,
        key: I64Vec3,
        query: Vec3,
        threshold: f32,
        out: &mut Vec<RangeMatch<'a>>,
    ) -> usize {
        let Some(bucket) = self.cells.get(&key.as_ivec3()) else {
            return 0;
        };
        for point in bucket {
            collect_match(point, query, threshold, out);
        }
        bucket.len()
    }

    pub(crate) fn stats(&self) -> GridStats {
        let mut sizes: Vec<usize> = self.cells.values().map(Vec::len).collect();
        if sizes.is_empty() {
            return GridStats::default();
        }
        sizes.sort_unstable();
        GridStats {
            cells: sizes.len(),
            points: self.len,
            mean_bucket: self.len as f32 / sizes.len() as f32,
            min_bucket: sizes[0],
            max_bucket: sizes[sizes.len() - 1],
            median_bucket: sizes[sizes.len() / 2],
        }
    }
}

/// Occupancy summary of a grid hash.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridStats {
    /// Non-empty cells.
    pub cells: usize,
    /// Stored points.
    pub points: usize,
    /// Average points per non-empty cell.
    pub mean_bucket: f32,
    /// Smallest non-empty bucket.
    pub min_bucket: usize,
    /// Largest bucket.
    pub max_bucket: usize,
    /// Upper median bucket size.
    pub median_bucket: usize,
}

impl fmt::Display for GridStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} points in {} cells (mean {:.2}, min {}, median {}, max {})",
            self.points,
            self.cells,
            self.mean_bucket,
            self.min_bucket,
            self.median_bucket,
            self.max_bucket
        )
    }
}

/// Spatial hash over cubic cells of a fixed size.
///
/// A query visits every cell of the box spanned by `query ± threshold` on
/// each axis. A match at distance at most `threshold` is within `threshold`
/// of the query on every axis, so nothing outside that box can qualify.
///
/// # Example
///
/// ```
/// use chroma_spatial::{ColorPoint, GridConfig, GridHashIndex, RangeIndex};
/// use glam::Vec3;
///
/// let mut index = GridHashIndex::new(GridConfig::new(30.0)).unwrap();
/// index.insert(ColorPoint::from_rgb(1, "a", 29, 29, 29));
///
/// // Neighbouring cell, still found
/// let hits = index.query(Vec3::splat(31.0), 5.0);
/// assert_eq!(hits.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GridHashIndex {
    grid: CellGrid,
}

impl GridHashIndex {
    /// Creates an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexError::InvalidCellSize`] for a non-positive or
    /// non-finite cell size.
    pub fn new(config: GridConfig) -> IndexResult<Self> {
        let grid = CellGrid::new(config)?;
        log::debug!("grid hash created with cell size {}", config.cell_size);
        Ok(Self { grid })
    }

    /// Edge length of a cell.
    pub fn cell_size(&self) -> f32 {
        self.grid.cell_size()
    }

    /// Occupancy summary.
    pub fn stats(&self) -> GridStats {
        self.grid.stats()
    }
}

impl Default for GridHashIndex {
    fn default() -> Self {
        Self {
            grid: CellGrid::with_valid_config(GridConfig::default()),
        }
    }
}

impl RangeIndex for GridHashIndex {
    fn name(&self) -> String {
        format!("Grid hash (cell_size={})", self.grid.cell_size())
    }

    fn insert(&mut self, point: ColorPoint) {
        self.grid.insert(point);
    }

    fn query(&self, query: Vec3, threshold: f32) -> Vec<RangeMatch<'_>> {
        let mut matches = Vec::new();
        let Some((lo, hi)) = self.grid.search_box(query, threshold) else {
            return matches;
        };

        let mut candidates = 0;
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                for z in lo.z..=hi.z {
                    candidates +=
                        self.grid
                            .scan_cell(I64Vec3::new(x, y, z), query, threshold, &mut matches);
                }
            }
        }
        sort_matches(&mut matches);
        log::trace!(
            "grid query over keys {lo}..={hi}: {candidates} candidates, {} matches",
            matches.len()
        );
        matches
    }

    fn len(&self) -> usize {
        self.grid.len()
    }
}
