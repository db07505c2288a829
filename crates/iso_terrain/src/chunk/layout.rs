//! Chunk lattice placement for both streaming modes.
//!
//! ```text
//! Fixed map (num_chunks = 3 along X, centred on the origin):
//!
//!   -1.5b      -0.5b       0.5b       1.5b
//!     ├──────────┼──────────┼──────────┤
//!     │ coord 0  │ coord 1  │ coord 2  │      centre = -total/2 + coord*b + b/2
//!     └──────────┴──────────┴──────────┘
//!
//! Viewer follow (lattice anchored at the origin):
//!
//!   -1.5b      -0.5b       0.5b       1.5b
//!     ├──────────┼──────────┼──────────┤
//!     │ coord -1 │ coord 0  │ coord 1  │      centre = coord*b
//!     └──────────┴──────────┴──────────┘
//! ```

use glam::{IVec3, Vec3};

use super::bounds::Aabb;
use crate::constants::{MAX_CHUNK_COORD, MAX_VIEW_CHUNKS};

/// Integer lattice coordinate of a chunk.
pub type ChunkCoord = IVec3;

/// How the chunk lattice is chosen each update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StreamingMode {
  /// Every coordinate in `[0, num_chunks)`, centred on the world origin.
  Fixed { num_chunks: IVec3 },
  /// Coordinates whose bounds lie within `view_distance` of the viewer.
  Follow { view_distance: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkLayout {
  pub bounds_size: f32,
  pub mode: StreamingMode,
}

impl ChunkLayout {
  pub fn new(bounds_size: f32, mode: StreamingMode) -> Self {
    Self { bounds_size, mode }
  }

  /// World-space centre of the chunk at `coord`.
  pub fn centre(&self, coord: ChunkCoord) -> Vec3 {
    let b = self.bounds_size;
    match self.mode {
      StreamingMode::Fixed { num_chunks } => {
        let total = num_chunks.as_vec3() * b;
        -total * 0.5 + coord.as_vec3() * b + Vec3::splat(b * 0.5)
      }
      StreamingMode::Follow { .. } => coord.as_vec3() * b,
    }
  }

  pub fn bounds(&self, coord: ChunkCoord) -> Aabb {
    Aabb::from_center_size(self.centre(coord), self.bounds_size)
  }

  /// Chunk coordinate containing the viewer: `round(position / bounds_size)`
  /// per axis. Halves round away from zero. Clamped to `±MAX_CHUNK_COORD` so
  /// a scan around it never leaves the `i32` lattice.
  pub fn viewer_coord(&self, position: Vec3) -> ChunkCoord {
    (position / self.bounds_size)
      .round()
      .as_ivec3()
      .clamp(IVec3::splat(-MAX_CHUNK_COORD), IVec3::splat(MAX_CHUNK_COORD))
  }

  /// Candidate scan radius in chunks for `view_distance`, at most
  /// `MAX_VIEW_CHUNKS`.
  pub fn scan_radius(&self, view_distance: f32) -> i32 {
    ((view_distance / self.bounds_size).ceil() as i32).clamp(0, MAX_VIEW_CHUNKS)
  }

  /// All coordinates of a fixed map, X fastest.
  pub fn fixed_coords(num_chunks: IVec3) -> impl Iterator<Item = ChunkCoord> {
    let n = num_chunks.max(IVec3::ZERO);
    (0..n.z).flat_map(move |z| (0..n.y).flat_map(move |y| (0..n.x).map(move |x| IVec3::new(x, y, z))))
  }

  /// True if `coord` lies inside a fixed map of `num_chunks`.
  pub fn in_fixed_map(coord: ChunkCoord, num_chunks: IVec3) -> bool {
    coord.cmpge(IVec3::ZERO).all() && coord.cmplt(num_chunks).all()
  }

  /// Whether the chunk at `coord` lies within `view_distance` of `viewer`,
  /// measured to the nearest point of its bounds.
  pub fn in_range(&self, coord: ChunkCoord, viewer: Vec3, view_distance: f32) -> bool {
    self.bounds(coord).distance_squared_to(viewer) <= view_distance * view_distance
  }
}
