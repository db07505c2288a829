//! Fills chunk grids from a density field.

use glam::{UVec3, Vec3};
use rayon::prelude::*;

use super::DensityField;
use crate::constants::index_to_coord;
use crate::error::GridError;
use crate::types::{DensityGrid, GridSample};

/// Evaluates a [`DensityField`] over grid points, clamping results to an
/// optional density range.
#[derive(Clone, Debug)]
pub struct DensitySampler<F> {
  field: F,
  density_range: Option<(f32, f32)>,
}

impl<F: DensityField> DensitySampler<F> {
  pub fn new(field: F) -> Self {
    Self {
      field,
      density_range: None,
    }
  }

  /// Clamp every sampled density into `[min, max]`.
  pub fn with_density_range(mut self, min: f32, max: f32) -> Self {
    self.density_range = Some((min, max));
    self
  }

  pub fn field(&self) -> &F {
    &self.field
  }

  pub fn density_range(&self) -> Option<(f32, f32)> {
    self.density_range
  }

  /// Density at a world position, after clamping.
  #[inline]
  pub fn sample(&self, position: Vec3) -> f32 {
    let density = self.field.density(position);
    match self.density_range {
      Some((min, max)) => density.clamp(min, max),
      None => density,
    }
  }

  /// Fill `grid` with one sample per point.
  ///
  /// Point `(x, y, z)` sits at
  /// `chunk_centre + (x, y, z) * spacing - bounds_size / 2` and its density is
  /// evaluated at that position plus `world_offset`. The stored position
  /// excludes the offset, so meshes stay in chunk layout space.
  ///
  /// `dimensions` must be equal on every axis. The grid is resized to match.
  #[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "density::fill"))]
  pub fn fill(
    &self,
    grid: &mut DensityGrid,
    dimensions: UVec3,
    bounds_size: f32,
    world_offset: Vec3,
    chunk_centre: Vec3,
    spacing: f32,
  ) -> Result<(), GridError> {
    if dimensions.x != dimensions.y || dimensions.y != dimensions.z {
      return Err(GridError::NonCubicDimensions(dimensions.to_array()));
    }
    let n = dimensions.x as usize;
    grid.resize(n)?;

    let origin = chunk_centre - Vec3::splat(bounds_size * 0.5);
    grid
      .samples_mut()
      .par_iter_mut()
      .enumerate()
      .for_each(|(idx, sample)| {
        let (x, y, z) = index_to_coord(idx, n);
        let position = origin + Vec3::new(x as f32, y as f32, z as f32) * spacing;
        *sample = GridSample::new(position, self.sample(position + world_offset));
      });
    Ok(())
  }

  /// Sample a standalone volume spanning `[0, bounds_size]` on each axis.
  pub fn generate(
    &self,
    dimensions: UVec3,
    bounds_size: f32,
    world_offset: Vec3,
  ) -> Result<DensityGrid, GridError> {
    let mut grid = DensityGrid::new(dimensions.x as usize)?;
    let spacing = bounds_size / (dimensions.x.saturating_sub(1).max(1)) as f32;
    self.fill(
      &mut grid,
      dimensions,
      bounds_size,
      world_offset,
      Vec3::splat(bounds_size * 0.5),
      spacing,
    )?;
    Ok(grid)
  }
}
