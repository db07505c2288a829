//! Configuration parsing for the streaming driver.

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use iso_terrain::{Frustum, GeneratorSettings};
use serde::Deserialize;
use std::path::Path;

/// Root configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
	/// Generator settings, passed to the streamer as is.
	pub generator: GeneratorSettings,
	/// Scripted viewer motion.
	#[serde(default)]
	pub viewer: ViewerConfig,
	/// Camera used for frustum culling. Omit to disable culling.
	pub camera: Option<CameraConfig>,
}

/// Viewer path: `start + velocity * tick`.
#[derive(Debug, Default, Deserialize)]
pub struct ViewerConfig {
	#[serde(default)]
	pub start: Vec3,
	/// World units per tick.
	#[serde(default)]
	pub velocity: Vec3,
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
	/// Look direction, relative to the viewer.
	#[serde(default = "default_direction")]
	pub direction: Vec3,
	/// Vertical field of view in degrees.
	#[serde(default = "default_fov")]
	pub fov_degrees: f32,
	#[serde(default = "default_far")]
	pub far: f32,
}

fn default_direction() -> Vec3 {
	Vec3::NEG_Z
}

fn default_fov() -> f32 {
	60.0
}

fn default_far() -> f32 {
	500.0
}

impl Config {
	/// Load configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let content = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {}", path.display()))?;
		let config: Config =
			toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;

		config
			.generator
			.validate()
			.with_context(|| "Invalid [generator] section")?;
		if config.generator.density.shape.is_none() {
			anyhow::bail!("[generator.density.shape] must be set");
		}
		if let Some(camera) = &config.camera {
			if camera.direction.normalize_or_zero().cross(Vec3::Y).length_squared() < 1e-6 {
				anyhow::bail!("camera direction must not be parallel to +Y");
			}
			if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
				anyhow::bail!("fov_degrees must be in (0, 180), got {}", camera.fov_degrees);
			}
			if camera.far <= 0.1 {
				anyhow::bail!("far must exceed the near plane (0.1), got {}", camera.far);
			}
		}

		Ok(config)
	}
}

impl ViewerConfig {
	pub fn position(&self, tick: u32) -> Vec3 {
		self.start + self.velocity * tick as f32
	}
}

impl CameraConfig {
	/// Frustum for a camera at `eye` with a square aspect ratio.
	pub fn frustum(&self, eye: Vec3) -> Frustum {
		let view = Mat4::look_at_rh(eye, eye + self.direction, Vec3::Y);
		let proj = Mat4::perspective_rh(self.fov_degrees.to_radians(), 1.0, 0.1, self.far);
		Frustum::from_view_projection(&(proj * view))
	}
}
