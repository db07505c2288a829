//! Error types for extraction, settings and streaming.

use thiserror::Error;

use crate::constants::MAX_VIEW_CHUNKS;
use crate::edge_id::EdgeId;

/// Which append buffer a dispatch overflowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
  Edges,
  Triangles,
}

impl std::fmt::Display for BufferKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      BufferKind::Edges => f.write_str("edge"),
      BufferKind::Triangles => f.write_str("triangle"),
    }
  }
}

/// Errors from building a density grid.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
  #[error("points per axis {0} is outside the supported range [2, 256]")]
  InvalidResolution(usize),

  #[error("grid needs {expected} samples, got {actual}")]
  SampleCountMismatch { expected: usize, actual: usize },

  #[error("dimensions {0:?} are not a cube; grids use the same resolution on every axis")]
  NonCubicDimensions([u32; 3]),
}

/// Errors that abort a single extraction dispatch. No partial mesh is
/// committed when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtractError {
  #[error("{buffer} buffer capacity {capacity} exceeded")]
  CapacityExceeded { buffer: BufferKind, capacity: usize },

  #[error("grid has {actual} points per axis but buffers are sized for {expected}")]
  ResolutionMismatch { expected: usize, actual: usize },

  #[error("triangle references edge {0} which produced no vertex")]
  MissingEdge(EdgeId),

  #[error(transparent)]
  Grid(#[from] GridError),
}

/// Invalid generator settings. Reported before any dispatch.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
  #[error("points per axis {0} is outside the supported range [2, 256]")]
  PointsPerAxis(usize),

  #[error("bounds size must be positive and finite, got {0}")]
  BoundsSize(f32),

  #[error("iso level must be finite, got {0}")]
  IsoLevel(f32),

  #[error("view distance must be non-negative and finite, got {0}")]
  ViewDistance(f32),

  #[error(
    "view distance {view_distance} spans more than {max} chunks of size {bounds_size}",
    max = MAX_VIEW_CHUNKS
  )]
  ViewRange { view_distance: f32, bounds_size: f32 },

  #[error("fixed map needs at least one chunk per axis, got {0:?}")]
  ChunkCount([i32; 3]),

  #[error("no density sampler configured")]
  MissingSampler,

  #[error("density range [{min}, {max}] must be finite with min <= max")]
  DensityRange { min: f32, max: f32 },

  #[error("invalid density shape: {0}")]
  Shape(String),
}

/// Errors raised by the chunk streamer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StreamError {
  #[error("viewer-follow streaming needs a viewer, none is set")]
  ViewerUnset,

  #[error(transparent)]
  Settings(#[from] SettingsError),
}
