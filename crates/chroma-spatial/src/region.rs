//! Bounding regions for the tree indexes.
//!
//! [`Aabb3`] partitions all three axes into octants; [`PlaneRect`] partitions
//! two of them into quadrants and ignores the third.

use glam::{Vec2, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::point::CHANNEL_MAX;

/// A region that a tree node covers and splits at its midpoint.
pub(crate) trait Region: Copy + std::fmt::Debug {
    /// Child slots of an internal node (`[Option<usize>; N]`).
    type Children: Default
        + Clone
        + AsRef<[Option<usize>]>
        + AsMut<[Option<usize>]>
        + std::fmt::Debug;

    /// Index of the child that owns `point`. A coordinate on the midpoint
    /// goes to the upper half.
    fn child_index(&self, point: Vec3) -> usize;

    /// Region of the child at `index`.
    fn child(&self, index: usize) -> Self;

    /// Lower bound on the distance from `point` to anything inside this
    /// region, over the axes the region structures.
    fn min_distance(&self, point: Vec3) -> f32;
}

/// Per-axis gap between `value` and the closed range `[min, max]`.
#[inline]
fn gap(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min - value
    } else if value > max {
        value - max
    } else {
        0.0
    }
}

/// 3D axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb3 {
    /// Creates a new AABB from min and max corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The whole colour cube `[0, 255]³`.
    pub fn color_cube() -> Self {
        Self::new(Vec3::ZERO, Vec3::splat(CHANNEL_MAX))
    }

    /// Returns the center of the AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Checks if this AABB contains a point.
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Octant `index` as a 3-bit code: x is bit 2, y bit 1, z bit 0.
    pub fn octant(&self, index: usize) -> Aabb3 {
        let center = self.center();
        let pick = |bit: usize, min: f32, mid: f32, max: f32| {
            if index & bit != 0 { (mid, max) } else { (min, mid) }
        };
        let (x0, x1) = pick(4, self.min.x, center.x, self.max.x);
        let (y0, y1) = pick(2, self.min.y, center.y, self.max.y);
        let (z0, z1) = pick(1, self.min.z, center.z, self.max.z);
        Aabb3::new(Vec3::new(x0, y0, z0), Vec3::new(x1, y1, z1))
    }
}

impl Region for Aabb3 {
    type Children = [Option<usize>; 8];

    fn child_index(&self, point: Vec3) -> usize {
        let center = self.center();
        let mut index = 0;
        if point.x >= center.x {
            index |= 4;
        }
        if point.y >= center.y {
            index |= 2;
        }
        if point.z >= center.z {
            index |= 1;
        }
        index
    }

    fn child(&self, index: usize) -> Self {
        self.octant(index)
    }

    fn min_distance(&self, point: Vec3) -> f32 {
        let dx = gap(point.x, self.min.x, self.max.x);
        let dy = gap(point.y, self.min.y, self.max.y);
        let dz = gap(point.z, self.min.z, self.max.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// The pair of axes a quadtree partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Plane {
    /// Red and green channels.
    #[default]
    Xy,
    /// Red and blue channels.
    Xz,
    /// Green and blue channels.
    Yz,
}

impl Plane {
    /// Projects a point onto this plane.
    pub fn project(self, point: Vec3) -> Vec2 {
        match self {
            Plane::Xy => Vec2::new(point.x, point.y),
            Plane::Xz => Vec2::new(point.x, point.z),
            Plane::Yz => Vec2::new(point.y, point.z),
        }
    }

    /// Short axis names, e.g. `"xy"`.
    pub fn axes(self) -> &'static str {
        match self {
            Plane::Xy => "xy",
            Plane::Xz => "xz",
            Plane::Yz => "yz",
        }
    }
}

/// Axis-aligned rectangle on one [`Plane`] of the colour cube.
///
/// The unstructured axis is unbounded: the rectangle stands for the whole
/// column above it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneRect {
    /// Axes this rectangle lives on.
    pub plane: Plane,
    /// Minimum corner (projected).
    pub min: Vec2,
    /// Maximum corner (projected).
    pub max: Vec2,
}

impl PlaneRect {
    /// Creates a rectangle on `plane`.
    pub fn new(plane: Plane, min: Vec2, max: Vec2) -> Self {
        Self { plane, min, max }
    }

    /// The colour cube seen from `plane`: `[0, 255]²`.
    pub fn color_square(plane: Plane) -> Self {
        Self::new(plane, Vec2::ZERO, Vec2::splat(CHANNEL_MAX))
    }

    /// Returns the center of the rectangle.
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Checks if the projection of `point` lies inside the rectangle.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let p = self.plane.project(point);
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Quadrant `index` as a 2-bit code: first axis is bit 1, second bit 0.
    pub fn quadrant(&self, index: usize) -> PlaneRect {
        let center = self.center();
        let (u0, u1) = if index & 2 != 0 {
            (center.x, self.max.x)
        } else {
            (self.min.x, center.x)
        };
        let (v0, v1) = if index & 1 != 0 {
            (center.y, self.max.y)
        } else {
            (self.min.y, center.y)
        };
        PlaneRect::new(self.plane, Vec2::new(u0, v0), Vec2::new(u1, v1))
    }
}

impl Region for PlaneRect {
    type Children = [Option<usize>; 4];

    fn child_index(&self, point: Vec3) -> usize {
        let p = self.plane.project(point);
        let center = self.center();
        let mut index = 0;
        if p.x >= center.x {
            index |= 2;
        }
        if p.y >= center.y {
            index |= 1;
        }
        index
    }

    fn child(&self, index: usize) -> Self {
        self.quadrant(index)
    }

    fn min_distance(&self, point: Vec3) -> f32 {
        let p = self.plane.project(point);
        let du = gap(p.x, self.min.x, self.max.x);
        let dv = gap(p.y, self.min.y, self.max.y);
        (du * du + dv * dv).sqrt()
    }
}
