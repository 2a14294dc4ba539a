//! Error types for index construction.

use thiserror::Error;

/// Errors raised while configuring an index or creating a point.
///
/// Queries and inserts have no error path: once an index exists every
/// `(point, threshold)` pair yields a (possibly empty) result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndexError {
    /// Grid cell size was zero, negative or not finite.
    #[error("invalid cell size: {0} (must be finite and > 0)")]
    InvalidCellSize(f32),

    /// Tree node capacity was zero.
    #[error("invalid node capacity: {0} (must be > 0)")]
    InvalidCapacity(usize),

    /// Tree depth ceiling was zero.
    #[error("invalid max depth: {0} (must be > 0)")]
    InvalidDepth(usize),

    /// A point coordinate fell outside the colour cube.
    #[error("coordinate {axis}={value} outside [0, 255]")]
    CoordinateOutOfRange {
        /// Axis name (`x`, `y` or `z`).
        axis: char,
        /// Offending value.
        value: f32,
    },
}

/// Result type for index construction.
pub type IndexResult<T> = Result<T, IndexError>;
