//! Built-in density shapes, selected by configuration.

use glam::Vec3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use super::DensityField;
use crate::error::SettingsError;

/// Upper bound accepted for fractal octaves.
const MAX_OCTAVES: usize = 16;

/// Configurable density shape.
///
/// ```toml
/// [generator.density.shape]
/// kind = "sphere"
/// radius = 4.0
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DensityShape {
  /// Signed distance to a sphere.
  Sphere {
    radius: f32,
    #[serde(default)]
    center: Vec3,
  },
  /// Signed distance to the plane `dot(p, normal) = height`. Inside is below.
  Plane { normal: Vec3, height: f32 },
  /// Signed distance to an axis-aligned box.
  Cuboid {
    half_extents: Vec3,
    #[serde(default)]
    center: Vec3,
  },
  /// Ground plane displaced by fractal Perlin noise.
  Noise {
    #[serde(default)]
    seed: u32,
    #[serde(default = "default_frequency")]
    frequency: f64,
    #[serde(default = "default_octaves")]
    octaves: usize,
    #[serde(default = "default_amplitude")]
    amplitude: f32,
    #[serde(default)]
    ground_level: f32,
  },
}

fn default_frequency() -> f64 {
  0.05
}

fn default_octaves() -> usize {
  4
}

fn default_amplitude() -> f32 {
  8.0
}

impl DensityShape {
  /// Check parameters without building the field.
  pub fn validate(&self) -> Result<(), SettingsError> {
    let fail = |msg: String| Err(SettingsError::Shape(msg));
    match *self {
      DensityShape::Sphere { radius, center } => {
        if !(radius > 0.0 && radius.is_finite()) {
          return fail(format!("sphere radius must be positive, got {radius}"));
        }
        if !center.is_finite() {
          return fail("sphere center must be finite".into());
        }
      }
      DensityShape::Plane { normal, height } => {
        if normal.try_normalize().is_none() {
          return fail(format!("plane normal {normal} cannot be normalized"));
        }
        if !height.is_finite() {
          return fail("plane height must be finite".into());
        }
      }
      DensityShape::Cuboid {
        half_extents,
        center,
      } => {
        if !(half_extents.cmpgt(Vec3::ZERO).all() && half_extents.is_finite()) {
          return fail(format!("box half extents must be positive, got {half_extents}"));
        }
        if !center.is_finite() {
          return fail("box center must be finite".into());
        }
      }
      DensityShape::Noise {
        frequency,
        octaves,
        amplitude,
        ground_level,
        ..
      } => {
        if !(frequency > 0.0 && frequency.is_finite()) {
          return fail(format!("noise frequency must be positive, got {frequency}"));
        }
        if !(1..=MAX_OCTAVES).contains(&octaves) {
          return fail(format!("noise octaves must be in [1, {MAX_OCTAVES}], got {octaves}"));
        }
        if !amplitude.is_finite() || !ground_level.is_finite() {
          return fail("noise amplitude and ground level must be finite".into());
        }
      }
    }
    Ok(())
  }

  /// Validate and build the evaluable field.
  pub fn build(&self) -> Result<DensityFunction, SettingsError> {
    self.validate()?;
    Ok(match *self {
      DensityShape::Sphere { radius, center } => DensityFunction::Sphere { center, radius },
      DensityShape::Plane { normal, height } => DensityFunction::Plane {
        normal: normal.normalize(),
        height,
      },
      DensityShape::Cuboid {
        half_extents,
        center,
      } => DensityFunction::Cuboid {
        center,
        half_extents,
      },
      DensityShape::Noise {
        seed,
        frequency,
        octaves,
        amplitude,
        ground_level,
      } => DensityFunction::Noise {
        fbm: Fbm::<Perlin>::new(seed)
          .set_octaves(octaves)
          .set_frequency(frequency),
        amplitude,
        ground_level,
      },
    })
  }
}

/// Evaluable form of a [`DensityShape`]. Static dispatch over the variants.
#[derive(Clone)]
pub enum DensityFunction {
  Sphere {
    center: Vec3,
    radius: f32,
  },
  Plane {
    normal: Vec3,
    height: f32,
  },
  Cuboid {
    center: Vec3,
    half_extents: Vec3,
  },
  Noise {
    fbm: Fbm<Perlin>,
    amplitude: f32,
    ground_level: f32,
  },
}

impl DensityField for DensityFunction {
  #[inline]
  fn density(&self, p: Vec3) -> f32 {
    match self {
      DensityFunction::Sphere { center, radius } => (p - *center).length() - radius,
      DensityFunction::Plane { normal, height } => p.dot(*normal) - height,
      DensityFunction::Cuboid {
        center,
        half_extents,
      } => {
        let q = (p - *center).abs() - *half_extents;
        q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
      }
      DensityFunction::Noise {
        fbm,
        amplitude,
        ground_level,
      } => {
        let n = fbm.get([p.x as f64, p.y as f64, p.z as f64]) as f32;
        (p.y - ground_level) - n * amplitude
      }
    }
  }
}

impl std::fmt::Debug for DensityFunction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      DensityFunction::Sphere { .. } => f.write_str("DensityFunction::Sphere"),
      DensityFunction::Plane { .. } => f.write_str("DensityFunction::Plane"),
      DensityFunction::Cuboid { .. } => f.write_str("DensityFunction::Cuboid"),
      DensityFunction::Noise { .. } => f.write_str("DensityFunction::Noise"),
    }
  }
}

#[cfg(test)]
#[path = "shapes_test.rs"]
mod shapes_test;
