//! View frustum for chunk visibility culling.

use glam::{Mat4, Vec3, Vec4};

use super::bounds::Aabb;

/// A plane defined by normal and distance from origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
  pub normal: Vec3,
  pub distance: f32,
}

impl Plane {
  pub fn new(normal: Vec3, distance: f32) -> Self {
    Self { normal, distance }
  }

  /// Signed distance from point to plane (positive = in front).
  #[inline]
  pub fn distance_to_point(&self, point: Vec3) -> f32 {
    self.normal.dot(point) + self.distance
  }
}

/// View frustum with 6 planes (near, far, left, right, top, bottom), normals
/// pointing inward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
  pub planes: [Plane; 6],
}

impl Frustum {
  pub fn from_planes(planes: [Plane; 6]) -> Self {
    Self { planes }
  }

  /// Extract planes from a view-projection matrix with `[0, 1]` clip depth
  /// (glam's `perspective_rh` / `orthographic_rh`).
  pub fn from_view_projection(vp: &Mat4) -> Self {
    let row0 = vp.row(0);
    let row1 = vp.row(1);
    let row2 = vp.row(2);
    let row3 = vp.row(3);

    let left = Self::normalize_plane(row3 + row0);
    let right = Self::normalize_plane(row3 - row0);
    let bottom = Self::normalize_plane(row3 + row1);
    let top = Self::normalize_plane(row3 - row1);
    let near = Self::normalize_plane(row2);
    let far = Self::normalize_plane(row3 - row2);

    Self {
      planes: [near, far, left, right, top, bottom],
    }
  }

  fn normalize_plane(plane: Vec4) -> Plane {
    let normal = plane.truncate();
    let len = normal.length();
    if len <= f32::EPSILON {
      // Degenerate row: a plane every point is in front of.
      return Plane::new(Vec3::ZERO, 1.0);
    }
    Plane {
      normal: normal / len,
      distance: plane.w / len,
    }
  }

  pub fn contains_point(&self, point: Vec3) -> bool {
    self
      .planes
      .iter()
      .all(|plane| plane.distance_to_point(point) >= 0.0)
  }

  /// Conservative AABB test: false only when the box lies entirely behind
  /// some plane.
  pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
    self.planes.iter().all(|plane| {
      // Corner most aligned with the plane normal (p-vertex)
      let p = Vec3::select(plane.normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
      plane.distance_to_point(p) >= 0.0
    })
  }
}
