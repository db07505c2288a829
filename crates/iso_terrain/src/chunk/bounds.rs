//! Axis-aligned chunk bounds.

use glam::Vec3;

/// Axis-aligned bounding box of a chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
  /// Minimum corner (inclusive).
  pub min: Vec3,
  /// Maximum corner (inclusive).
  pub max: Vec3,
}

impl Aabb {
  /// # Panics
  /// Debug-asserts that min <= max on all axes.
  pub fn new(min: Vec3, max: Vec3) -> Self {
    debug_assert!(min.cmple(max).all(), "AABB min must be <= max on all axes");
    Self { min, max }
  }

  /// Cube of edge length `size` centred on `center`.
  pub fn from_center_size(center: Vec3, size: f32) -> Self {
    let half = Vec3::splat(size * 0.5);
    Self {
      min: center - half,
      max: center + half,
    }
  }

  /// Squared distance from `point` to the closest point of the box.
  ///
  /// Each axis is clamped independently, so a point inside the box has
  /// distance zero.
  #[inline]
  pub fn distance_squared_to(&self, point: Vec3) -> f32 {
    let closest = point.clamp(self.min, self.max);
    (point - closest).length_squared()
  }

  #[inline]
  pub fn contains_point(&self, point: Vec3) -> bool {
    point.cmpge(self.min).all() && point.cmple(self.max).all()
  }

  /// Two boxes overlap if they share any interior or boundary points.
  #[inline]
  pub fn overlaps(&self, other: &Aabb) -> bool {
    self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
  }

  #[inline]
  pub fn size(&self) -> Vec3 {
    self.max - self.min
  }

  #[inline]
  pub fn center(&self) -> Vec3 {
    (self.min + self.max) * 0.5
  }
}
