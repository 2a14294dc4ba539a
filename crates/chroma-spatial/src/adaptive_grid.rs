//! Grid hash that expands its search in concentric shells.

use glam::{I64Vec3, Vec3};

use crate::grid::CellGrid;
use crate::{
    ColorPoint, GridConfig, GridStats, IndexResult, RangeIndex, RangeMatch, sort_matches,
};

/// Spatial hash that visits cells shell by shell, nearest shell first.
///
/// Shell `r` is the set of cells whose largest per-axis offset from the
/// query's cell is exactly `r`; shell 0 is the query's own cell. Shells are
/// clipped to the same search box [`crate::GridHashIndex`] scans, so
/// [`RangeIndex::query`] returns the same set.
///
/// [`Self::query_capped`] can stop after the first shell that brings the
/// match count up to a cap. That is an approximation: a later shell can hold
/// points closer than some already found, so capped results are not
/// guaranteed to be the globally nearest.
#[derive(Debug, Clone)]
pub struct AdaptiveGridHashIndex {
    grid: CellGrid,
}

impl AdaptiveGridHashIndex {
    /// Creates an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`crate::IndexError::InvalidCellSize`] for a non-positive or
    /// non-finite cell size.
    pub fn new(config: GridConfig) -> IndexResult<Self> {
        let grid = CellGrid::new(config)?;
        log::debug!("adaptive grid hash created with cell size {}", config.cell_size);
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

    /// Like [`RangeIndex::query`], but stops expanding once at least `cap`
    /// matches have been found and returns at most `cap` of them.
    ///
    /// The shell that reaches the cap is always scanned in full before the
    /// results are sorted and truncated. Every returned point is a true
    /// match, but not necessarily one of the `cap` nearest.
    pub fn query_capped(&self, query: Vec3, threshold: f32, cap: usize) -> Vec<RangeMatch<'_>> {
        if cap == 0 {
            return Vec::new();
        }
        let mut matches = self.expand(query, threshold, Some(cap));
        matches.truncate(cap);
        matches
    }

    fn expand(&self, query: Vec3, threshold: f32, cap: Option<usize>) -> Vec<RangeMatch<'_>> {
        let mut matches = Vec::new();
        let Some(bounds) = self.grid.search_box(query, threshold) else {
            return matches;
        };

        let center = self.grid.cell_key(query).as_i64vec3();
        // Shells nearer than `first` or beyond `last` miss the search box
        let first = (bounds.0 - center)
            .max(center - bounds.1)
            .max(I64Vec3::ZERO)
            .max_element();
        let last = (center - bounds.0)
            .abs()
            .max((bounds.1 - center).abs())
            .max_element();

        let mut candidates = 0;
        let mut shells = 0;
        for radius in first..=last {
            candidates += self.scan_shell(center, radius, bounds, query, threshold, &mut matches);
            shells += 1;
            if cap.is_some_and(|cap| matches.len() >= cap) {
                break;
            }
        }
        sort_matches(&mut matches);
        log::trace!(
            "adaptive grid query: {shells} shells, {candidates} candidates, {} matches",
            matches.len()
        );
        matches
    }

    /// Scans the cells at Chebyshev distance exactly `radius` from `center`
    /// that fall inside `bounds`. Returns the number of candidates.
    fn scan_shell<'a>(
        &'a self,
        center: I64Vec3,
        radius: i64,
        bounds: (I64Vec3, I64Vec3),
        query: Vec3,
        threshold: f32,
        out: &mut Vec<RangeMatch<'a>>,
    ) -> usize {
        // Offsets relative to center, clipped to the search box
        let lo = (bounds.0 - center).max(I64Vec3::splat(-radius));
        let hi = (bounds.1 - center).min(I64Vec3::splat(radius));
        if lo.cmpgt(hi).any() {
            return 0;
        }

        let mut candidates = 0;
        for dx in lo.x..=hi.x {
            for dy in lo.y..=hi.y {
                if dx.abs() == radius || dy.abs() == radius {
                    // On an x or y face: the whole z column is on the shell
                    for dz in lo.z..=hi.z {
                        let key = center + I64Vec3::new(dx, dy, dz);
                        candidates += self.grid.scan_cell(key, query, threshold, out);
                    }
                } else {
                    // Interior column: only the two z caps
                    for dz in [-radius, radius] {
                        if (lo.z..=hi.z).contains(&dz) {
                            let key = center + I64Vec3::new(dx, dy, dz);
                            candidates += self.grid.scan_cell(key, query, threshold, out);
                        }
                    }
                }
            }
        }
        candidates
    }
}

impl Default for AdaptiveGridHashIndex {
    fn default() -> Self {
        Self {
            grid: CellGrid::with_valid_config(GridConfig::adaptive()),
        }
    }
}

impl RangeIndex for AdaptiveGridHashIndex {
    fn name(&self) -> String {
        format!("Adaptive grid hash (cell_size={})", self.grid.cell_size())
    }

    fn insert(&mut self, point: ColorPoint) {
        self.grid.insert(point);
    }

    fn query(&self, query: Vec3, threshold: f32) -> Vec<RangeMatch<'_>> {
        self.expand(query, threshold, None)
    }

    fn len(&self) -> usize {
        self.grid.len()
    }
}
