//! Construction-time configuration for the hashed and tree indexes.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{IndexError, IndexResult};

/// Configuration for the grid hash indexes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridConfig {
    /// Edge length of a cubic cell. Smaller cells mean fewer false
    /// candidates per cell but more cells to enumerate per query.
    pub cell_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { cell_size: 30.0 }
    }
}

impl GridConfig {
    /// Creates a configuration with the given cell size.
    pub fn new(cell_size: f32) -> Self {
        Self { cell_size }
    }

    /// Default configuration for the shell-expanding grid.
    pub fn adaptive() -> Self {
        Self { cell_size: 25.0 }
    }

    /// Checks that the cell size is finite and positive.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidCellSize`] otherwise.
    pub fn validate(&self) -> IndexResult<()> {
        if self.cell_size.is_finite() && self.cell_size > 0.0 {
            Ok(())
        } else {
            Err(IndexError::InvalidCellSize(self.cell_size))
        }
    }
}

/// Configuration for the octree and quadtree indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeConfig {
    /// Leaf population above which a leaf splits.
    pub max_points_per_node: usize,
    /// Depth at which leaves stop splitting and may overflow instead.
    /// The root is at depth 0.
    pub max_depth: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_points_per_node: 10,
            max_depth: 10,
        }
    }
}

impl TreeConfig {
    /// Creates a configuration with the given capacity and depth ceiling.
    pub fn new(max_points_per_node: usize, max_depth: usize) -> Self {
        Self {
            max_points_per_node,
            max_depth,
        }
    }

    /// Default configuration for the quadtree, whose leaves cover a whole
    /// column of the third axis and so are given more room.
    pub fn quadtree() -> Self {
        Self {
            max_points_per_node: 25,
            max_depth: 10,
        }
    }

    /// Checks that capacity and depth are both non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidCapacity`] or [`IndexError::InvalidDepth`].
    pub fn validate(&self) -> IndexResult<()> {
        if self.max_points_per_node == 0 {
            return Err(IndexError::InvalidCapacity(self.max_points_per_node));
        }
        if self.max_depth == 0 {
            return Err(IndexError::InvalidDepth(self.max_depth));
        }
        Ok(())
    }
}
