use glam::Vec3;

use crate::{ColorPoint, RangeIndex, RangeMatch, collect_match, sort_matches};

/// Append-only list scanned in full on every query.
///
/// The baseline: no preprocessing and no pruning, so its result set is the
/// reference every other index is checked against.
#[derive(Debug, Clone, Default)]
pub struct LinearIndex {
    points: Vec<ColorPoint>,
}

impl LinearIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index with room for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Stored points in insertion order.
    pub fn points(&self) -> &[ColorPoint] {
        &self.points
    }
}

impl RangeIndex for LinearIndex {
    fn name(&self) -> String {
        "Linear".to_string()
    }

    fn insert(&mut self, point: ColorPoint) {
        self.points.push(point);
    }

    fn query(&self, query: Vec3, threshold: f32) -> Vec<RangeMatch<'_>> {
        let mut matches = Vec::new();
        for point in &self.points {
            collect_match(point, query, threshold, &mut matches);
        }
        sort_matches(&mut matches);
        log::trace!(
            "linear query scanned {} points, {} matches",
            self.points.len(),
            matches.len()
        );
        matches
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}
