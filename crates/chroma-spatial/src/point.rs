//! Indexed points and the distance metric.

use glam::Vec3;

use crate::{IndexError, IndexResult};

/// Upper bound of every coordinate axis (8-bit colour channel maximum).
pub const CHANNEL_MAX: f32 = 255.0;

/// A point in colour space with a caller-assigned identity.
///
/// Fields are private so a point cannot change after it has been indexed.
/// The `id` is never recomputed or deduplicated: two points with the same
/// id are two entries.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPoint {
    id: u64,
    label: String,
    position: Vec3,
}

impl ColorPoint {
    /// Creates a point, checking that every coordinate lies in `[0, 255]`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::CoordinateOutOfRange`] for a coordinate that is
    /// outside the colour cube or not finite.
    pub fn new(id: u64, label: impl Into<String>, position: Vec3) -> IndexResult<Self> {
        for (axis, value) in [('x', position.x), ('y', position.y), ('z', position.z)] {
            if !(0.0..=CHANNEL_MAX).contains(&value) {
                return Err(IndexError::CoordinateOutOfRange { axis, value });
            }
        }
        Ok(Self {
            id,
            label: label.into(),
            position,
        })
    }

    /// Creates a point from 8-bit channels. Always in range.
    pub fn from_rgb(id: u64, label: impl Into<String>, r: u8, g: u8, b: u8) -> Self {
        Self {
            id,
            label: label.into(),
            position: Vec3::new(f32::from(r), f32::from(g), f32::from(b)),
        }
    }

    /// Caller-assigned identity.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Free-form label (typically a file name).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Coordinates in colour space.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &ColorPoint) -> f32 {
        distance(self.position, other.position)
    }
}

/// Euclidean distance in three dimensions.
///
/// Every index accepts or rejects candidates with this function and nothing
/// else; the structures only differ in which candidates they look at.
#[inline]
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}
