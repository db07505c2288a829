//! Generator settings: a plain, serde-deserialisable configuration struct.
//!
//! ```toml
//! [generator]
//! fixed_map_size = false
//! view_distance = 40.0
//! bounds_size = 10.0
//! points_per_axis = 24
//!
//! [generator.density]
//! density_range = [-10.0, 10.0]
//!
//! [generator.density.shape]
//! kind = "noise"
//! seed = 3
//! ```

use glam::{IVec3, UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::chunk::{ChunkLayout, StreamingMode};
use crate::constants::{
  DEFAULT_POINTS_PER_AXIS, MAX_POINTS_PER_AXIS, MAX_VIEW_CHUNKS, MIN_POINTS_PER_AXIS,
};
use crate::density::{DensityFunction, DensitySampler, DensityShape};
use crate::error::SettingsError;
use crate::extraction_stage::SampleParams;

/// Where an update request originates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateContext {
  /// Editing or tooling, outside a running simulation.
  Interactive,
  /// Running simulation (the game loop).
  Simulation,
}

/// Lifetime of extraction buffers between dispatch batches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferLifetime {
  /// Keep buffers until teardown. Reallocate only on resolution change.
  #[default]
  Persistent,
  /// Allocate before each dispatch batch and drop afterwards.
  ReleaseAfterDispatch,
}

/// Density field selection and post-processing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensitySettings {
  /// `None` means no sampler is configured.
  pub shape: Option<DensityShape>,
  /// Clamp sampled densities into `[min, max]`.
  pub density_range: Option<[f32; 2]>,
}

impl DensitySettings {
  /// Build the configured sampler, failing fast if none is configured.
  pub fn build_sampler(&self) -> Result<DensitySampler<DensityFunction>, SettingsError> {
    let shape = self.shape.as_ref().ok_or(SettingsError::MissingSampler)?;
    let sampler = DensitySampler::new(shape.build()?);
    match self.checked_range()? {
      Some((min, max)) => Ok(sampler.with_density_range(min, max)),
      None => Ok(sampler),
    }
  }

  /// The clamp range, if set. Both bounds must be finite and ordered.
  pub fn checked_range(&self) -> Result<Option<(f32, f32)>, SettingsError> {
    match self.density_range {
      Some([min, max]) if !(min.is_finite() && max.is_finite() && min <= max) => {
        Err(SettingsError::DensityRange { min, max })
      }
      Some([min, max]) => Ok(Some((min, max))),
      None => Ok(None),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
  /// Fixed rectangular map (true) or chunks streamed around a viewer.
  pub fixed_map_size: bool,
  /// Chunks per axis in fixed mode.
  pub num_chunks: IVec3,
  /// Streaming radius in follow mode.
  pub view_distance: f32,
  /// Skip chunks outside the camera frustum when one is supplied.
  pub frustum_culling: bool,

  pub iso_level: f32,
  /// Edge length of one chunk in world units.
  pub bounds_size: f32,
  /// Added to every sample position before evaluating density.
  pub offset: Vec3,
  /// Grid resolution per chunk, in `[2, 256]`.
  pub points_per_axis: usize,

  pub auto_update_in_editor: bool,
  pub auto_update_in_game: bool,
  pub buffer_lifetime: BufferLifetime,

  pub density: DensitySettings,
}

impl Default for GeneratorSettings {
  fn default() -> Self {
    Self {
      fixed_map_size: false,
      num_chunks: IVec3::ONE,
      view_distance: 30.0,
      frustum_culling: true,
      iso_level: 0.0,
      bounds_size: 1.0,
      offset: Vec3::ZERO,
      points_per_axis: DEFAULT_POINTS_PER_AXIS,
      auto_update_in_editor: true,
      auto_update_in_game: true,
      buffer_lifetime: BufferLifetime::Persistent,
      density: DensitySettings::default(),
    }
  }
}

impl GeneratorSettings {
  pub fn validate(&self) -> Result<(), SettingsError> {
    if !(MIN_POINTS_PER_AXIS..=MAX_POINTS_PER_AXIS).contains(&self.points_per_axis) {
      return Err(SettingsError::PointsPerAxis(self.points_per_axis));
    }
    if !(self.bounds_size > 0.0 && self.bounds_size.is_finite()) {
      return Err(SettingsError::BoundsSize(self.bounds_size));
    }
    if !self.iso_level.is_finite() {
      return Err(SettingsError::IsoLevel(self.iso_level));
    }
    if self.fixed_map_size {
      if self.num_chunks.cmplt(IVec3::ONE).any() {
        return Err(SettingsError::ChunkCount(self.num_chunks.to_array()));
      }
    } else if !(self.view_distance >= 0.0 && self.view_distance.is_finite()) {
      return Err(SettingsError::ViewDistance(self.view_distance));
    } else if self.view_distance / self.bounds_size > MAX_VIEW_CHUNKS as f32 {
      return Err(SettingsError::ViewRange {
        view_distance: self.view_distance,
        bounds_size: self.bounds_size,
      });
    }
    self.density.checked_range()?;
    if let Some(shape) = &self.density.shape {
      shape.validate()?;
    }
    Ok(())
  }

  /// Distance between adjacent grid points.
  pub fn point_spacing(&self) -> f32 {
    self.bounds_size / (self.points_per_axis.max(MIN_POINTS_PER_AXIS) - 1) as f32
  }

  pub fn streaming_mode(&self) -> StreamingMode {
    if self.fixed_map_size {
      StreamingMode::Fixed {
        num_chunks: self.num_chunks,
      }
    } else {
      StreamingMode::Follow {
        view_distance: self.view_distance,
      }
    }
  }

  pub fn layout(&self) -> ChunkLayout {
    ChunkLayout::new(self.bounds_size, self.streaming_mode())
  }

  pub fn sample_params(&self) -> SampleParams {
    SampleParams {
      dimensions: UVec3::splat(self.points_per_axis as u32),
      bounds_size: self.bounds_size,
      world_offset: self.offset,
      spacing: self.point_spacing(),
      iso_level: self.iso_level,
    }
  }

  /// Whether an update requested from `context` should run.
  pub fn allows_update(&self, context: UpdateContext) -> bool {
    match context {
      UpdateContext::Interactive => self.auto_update_in_editor,
      UpdateContext::Simulation => self.auto_update_in_game,
    }
  }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;
