//! Core data types: sampled density grids and extracted meshes.

use glam::{UVec3, Vec3};

use crate::constants::{
  coord_to_index, corner_index_offsets, point_count, MAX_POINTS_PER_AXIS, MIN_POINTS_PER_AXIS,
};
use crate::error::GridError;

/// One sampled grid point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridSample {
  /// World (or chunk-local) position of the sample.
  pub position: Vec3,
  /// Scalar density. Below the iso level counts as inside.
  pub density: f32,
}

impl GridSample {
  #[inline(always)]
  pub const fn new(position: Vec3, density: f32) -> Self {
    Self { position, density }
  }
}

/// Dense `n × n × n` array of samples in `(x + y*n + z*n²)` order.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityGrid {
  points_per_axis: usize,
  samples: Vec<GridSample>,
}

impl DensityGrid {
  /// Zero-filled grid with `n` points per axis.
  pub fn new(points_per_axis: usize) -> Result<Self, GridError> {
    check_resolution(points_per_axis)?;
    Ok(Self {
      points_per_axis,
      samples: vec![GridSample::default(); point_count(points_per_axis)],
    })
  }

  /// Wrap existing samples. The sample count must be exactly `n³`.
  pub fn from_samples(points_per_axis: usize, samples: Vec<GridSample>) -> Result<Self, GridError> {
    check_resolution(points_per_axis)?;
    let expected = point_count(points_per_axis);
    if samples.len() != expected {
      return Err(GridError::SampleCountMismatch {
        expected,
        actual: samples.len(),
      });
    }
    Ok(Self {
      points_per_axis,
      samples,
    })
  }

  /// Grid whose sample positions are `coord * spacing`, with the given
  /// densities in grid order.
  pub fn from_densities(
    points_per_axis: usize,
    spacing: f32,
    densities: &[f32],
  ) -> Result<Self, GridError> {
    check_resolution(points_per_axis)?;
    let expected = point_count(points_per_axis);
    if densities.len() != expected {
      return Err(GridError::SampleCountMismatch {
        expected,
        actual: densities.len(),
      });
    }
    let n = points_per_axis;
    let samples = densities
      .iter()
      .enumerate()
      .map(|(idx, &density)| {
        let (x, y, z) = crate::constants::index_to_coord(idx, n);
        GridSample::new(Vec3::new(x as f32, y as f32, z as f32) * spacing, density)
      })
      .collect();
    Ok(Self {
      points_per_axis,
      samples,
    })
  }

  /// Change resolution, reusing the allocation where possible. Sample
  /// contents are unspecified afterwards and must be refilled.
  pub fn resize(&mut self, points_per_axis: usize) -> Result<(), GridError> {
    check_resolution(points_per_axis)?;
    if points_per_axis != self.points_per_axis {
      self.points_per_axis = points_per_axis;
      self
        .samples
        .resize(point_count(points_per_axis), GridSample::default());
    }
    Ok(())
  }

  #[inline(always)]
  pub fn points_per_axis(&self) -> usize {
    self.points_per_axis
  }

  #[inline(always)]
  pub fn samples(&self) -> &[GridSample] {
    &self.samples
  }

  #[inline(always)]
  pub fn samples_mut(&mut self) -> &mut [GridSample] {
    &mut self.samples
  }

  #[inline(always)]
  pub fn sample(&self, coord: UVec3) -> GridSample {
    self.samples[coord_to_index(
      coord.x as usize,
      coord.y as usize,
      coord.z as usize,
      self.points_per_axis,
    )]
  }

  /// Densities of the 8 corners of the cube based at `cube`, in corner order.
  #[inline]
  pub fn cube_densities(&self, cube: UVec3) -> [f32; 8] {
    let n = self.points_per_axis;
    let base = coord_to_index(cube.x as usize, cube.y as usize, cube.z as usize, n);
    corner_index_offsets(n).map(|offset| self.samples[base + offset].density)
  }

  /// True if every sample lies on the same side of `iso`, in which case no
  /// cube can produce geometry.
  pub fn is_homogeneous(&self, iso: f32) -> bool {
    let Some(first) = self.samples.first() else {
      return true;
    };
    let inside = first.density < iso;
    self.samples.iter().all(|s| (s.density < iso) == inside)
  }
}

fn check_resolution(points_per_axis: usize) -> Result<(), GridError> {
  if (MIN_POINTS_PER_AXIS..=MAX_POINTS_PER_AXIS).contains(&points_per_axis) {
    Ok(())
  } else {
    Err(GridError::InvalidResolution(points_per_axis))
  }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: Vec3,
  pub max: Vec3,
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: Vec3::INFINITY,
      max: Vec3::NEG_INFINITY,
    }
  }

  pub fn new(min: Vec3, max: Vec3) -> Self {
    Self { min, max }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: Vec3) {
    self.min = self.min.min(point);
    self.max = self.max.max(point);
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min.cmple(self.max).all()
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Extraction result: deduplicated vertices and a flat triangle index list.
///
/// Triangle order (and vertex order) from the parallel extractor is not
/// deterministic. Consumers derive normals from winding, see
/// [`crate::normals::recalculate_normals`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshOutput {
  pub vertices: Vec<Vec3>,

  /// Triangle indices (3 indices per triangle).
  pub indices: Vec<u32>,

  /// Bounding box encompassing all vertices.
  pub bounds: MinMaxAABB,
}

impl MeshOutput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Clear all buffers, preserving capacity.
  pub fn clear(&mut self) {
    self.vertices.clear();
    self.indices.clear();
    self.bounds = MinMaxAABB::empty();
  }

  /// Returns true if no geometry was generated.
  pub fn is_empty(&self) -> bool {
    self.vertices.is_empty()
  }

  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
    self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
  }

  /// Index count is a multiple of 3 and every index addresses a vertex.
  pub fn is_well_formed(&self) -> bool {
    let count = self.vertices.len();
    self.indices.len() % 3 == 0 && self.indices.iter().all(|&i| (i as usize) < count)
  }

  pub(crate) fn recompute_bounds(&mut self) {
    let mut bounds = MinMaxAABB::empty();
    for &v in &self.vertices {
      bounds.encapsulate(v);
    }
    self.bounds = bounds;
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
