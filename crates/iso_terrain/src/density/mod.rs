//! Density fields and grid sampling.
//!
//! The extractor only needs `density(position) -> f32`. [`DensityField`] is
//! that capability. Closures implement it directly, and [`DensityShape`]
//! provides the configurable built-in fields. [`DensitySampler`] evaluates a
//! field over a chunk's grid.
//!
//! Density below the iso level is inside the surface.

mod sampler;
mod shapes;

pub use sampler::DensitySampler;
pub use shapes::{DensityFunction, DensityShape};

use glam::Vec3;

/// Scalar field sampled by the extractor.
pub trait DensityField: Send + Sync {
  fn density(&self, position: Vec3) -> f32;
}

impl<F> DensityField for F
where
  F: Fn(Vec3) -> f32 + Send + Sync,
{
  #[inline(always)]
  fn density(&self, position: Vec3) -> f32 {
    self(position)
  }
}
