//! Cube configuration from corner densities.
//!
//! The configuration is an 8-bit value where bit `k` is set when corner `k`
//! lies strictly below the iso level. A density equal to the iso level counts
//! as outside.

/// Build the configuration index from the 8 corner densities.
#[inline]
pub fn build(densities: &[f32; 8], iso: f32) -> u8 {
  let mut mask = 0u8;
  for (corner, &density) in densities.iter().enumerate() {
    if density < iso {
      mask |= 1 << corner;
    }
  }
  mask
}

/// True for configurations that cannot produce geometry.
#[inline(always)]
pub const fn is_homogeneous(config: u8) -> bool {
  config == 0 || config == 255
}
