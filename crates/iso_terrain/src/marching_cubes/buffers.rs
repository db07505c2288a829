//! Output buffers for the parallel extractor.
//!
//! Capacities are conservative upper bounds derived from the resolution:
//!
//! ```text
//! edges     ≤ n³ · 3          (every point owns +X, +Y, +Z)
//! triangles ≤ (n - 1)³ · 5    (at most 5 triangles per cube)
//! ```
//!
//! Buffers are tied to one resolution. Dispatching a grid of another
//! resolution is rejected until [`ExtractionBuffers::ensure_resolution`]
//! reallocates them.

use super::{EdgeTriangle, EdgeVertex};
use crate::append_buffer::AppendBuffer;
use crate::constants::{cube_count, point_count, EDGES_PER_POINT, MAX_TRIANGLES_PER_CUBE};
use crate::error::ExtractError;

#[derive(Debug)]
pub struct ExtractionBuffers {
  points_per_axis: usize,
  capacity_scale: usize,
  pub(crate) edges: AppendBuffer<EdgeVertex>,
  pub(crate) triangles: AppendBuffer<EdgeTriangle>,
}

impl ExtractionBuffers {
  /// Buffers sized for the worst case at `points_per_axis`.
  pub fn new(points_per_axis: usize) -> Self {
    Self::with_capacity_scale(points_per_axis, 1)
  }

  /// Buffers with capacities multiplied by `scale`. Used to retry after a
  /// capacity error with custom caps.
  pub fn with_capacity_scale(points_per_axis: usize, scale: usize) -> Self {
    let scale = scale.max(1);
    Self {
      points_per_axis,
      capacity_scale: scale,
      edges: AppendBuffer::with_capacity(edge_capacity(points_per_axis) * scale),
      triangles: AppendBuffer::with_capacity(triangle_capacity(points_per_axis) * scale),
    }
  }

  /// Buffers with explicit capacities.
  pub fn with_capacities(points_per_axis: usize, edges: usize, triangles: usize) -> Self {
    Self {
      points_per_axis,
      capacity_scale: 1,
      edges: AppendBuffer::with_capacity(edges),
      triangles: AppendBuffer::with_capacity(triangles),
    }
  }

  #[inline]
  pub fn points_per_axis(&self) -> usize {
    self.points_per_axis
  }

  #[inline]
  pub fn edge_capacity(&self) -> usize {
    self.edges.capacity()
  }

  #[inline]
  pub fn triangle_capacity(&self) -> usize {
    self.triangles.capacity()
  }

  /// Reallocate for a new resolution. Returns true if buffers were replaced.
  pub fn ensure_resolution(&mut self, points_per_axis: usize) -> bool {
    if points_per_axis == self.points_per_axis {
      return false;
    }
    tracing::debug!(
      from = self.points_per_axis,
      to = points_per_axis,
      "reallocating extraction buffers"
    );
    *self = Self::with_capacity_scale(points_per_axis, self.capacity_scale);
    true
  }

  pub(crate) fn check_resolution(&self, points_per_axis: usize) -> Result<(), ExtractError> {
    if points_per_axis == self.points_per_axis {
      Ok(())
    } else {
      Err(ExtractError::ResolutionMismatch {
        expected: self.points_per_axis,
        actual: points_per_axis,
      })
    }
  }

  pub(crate) fn reset(&mut self) {
    self.edges.reset();
    self.triangles.reset();
  }
}

/// Worst-case edge records for `n` points per axis.
pub const fn edge_capacity(points_per_axis: usize) -> usize {
  point_count(points_per_axis) * EDGES_PER_POINT
}

/// Worst-case triangles for `n` points per axis.
pub const fn triangle_capacity(points_per_axis: usize) -> usize {
  cube_count(points_per_axis) * MAX_TRIANGLES_PER_CUBE
}
