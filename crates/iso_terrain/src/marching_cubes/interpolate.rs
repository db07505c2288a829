//! Edge crossing tests and vertex placement.

use glam::Vec3;

use crate::types::GridSample;

/// True when exactly one endpoint is below `iso`.
#[inline(always)]
pub fn straddles(da: f32, db: f32, iso: f32) -> bool {
  (da < iso) != (db < iso)
}

/// Point on the segment `a → b` where the linearly interpolated density
/// reaches `iso`. Equal densities fall back to the midpoint.
#[inline]
pub fn crossing(a: GridSample, b: GridSample, iso: f32) -> Vec3 {
  let delta = b.density - a.density;
  if delta == 0.0 {
    return (a.position + b.position) * 0.5;
  }
  let t = (iso - a.density) / delta;
  a.position + (b.position - a.position) * t
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample(p: Vec3, d: f32) -> GridSample {
    GridSample::new(p, d)
  }

  #[test]
  fn test_straddles() {
    assert!(straddles(-1.0, 1.0, 0.0));
    assert!(straddles(1.0, -1.0, 0.0));
    assert!(!straddles(1.0, 2.0, 0.0));
    assert!(!straddles(-1.0, -2.0, 0.0));
    // Equality is outside
    assert!(!straddles(0.0, 1.0, 0.0));
    assert!(straddles(0.0, -1.0, 0.0));
  }

  #[test]
  fn test_crossing_midpoint() {
    let p = crossing(sample(Vec3::ZERO, -1.0), sample(Vec3::Z, 1.0), 0.0);
    assert_eq!(p, Vec3::new(0.0, 0.0, 0.5));
  }

  #[test]
  fn test_crossing_weighted() {
    let p = crossing(sample(Vec3::ZERO, -1.0), sample(Vec3::X * 4.0, 3.0), 0.0);
    assert!((p - Vec3::X).length() < 1e-6);
  }

  #[test]
  fn test_crossing_respects_iso() {
    let p = crossing(sample(Vec3::ZERO, 0.0), sample(Vec3::Y, 10.0), 2.5);
    assert!((p - Vec3::Y * 0.25).length() < 1e-6);
  }

  #[test]
  fn test_degenerate_falls_back_to_midpoint() {
    let p = crossing(sample(Vec3::ZERO, 1.0), sample(Vec3::splat(2.0), 1.0), 1.0);
    assert_eq!(p, Vec3::ONE);
    assert!(p.is_finite());
  }
}
