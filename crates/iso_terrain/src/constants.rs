//! Grid layout constants and index math for density grids.
//!
//! A chunk's density grid is a dense `n × n × n` array of samples, where `n`
//! is the number of points per axis. Cubes (voxels) sit between samples, so a
//! grid of `n` points per axis holds `(n - 1)³` cubes.
//!
//! # Memory Layout
//!
//! ```text
//! Grid memory layout (row-major, X innermost):
//!
//! Address:  0       1       ...  n-1       n       ...  n²-1        n²  ...
//! Content: [0,0,0] [1,0,0] ... [n-1,0,0] [0,1,0] ... [n-1,n-1,0] [0,0,1] ...
//!          └──────── X ───────┘└──────── X ───────┘
//!
//! index = x + y * n + z * n²
//!       = (z * n + y) * n + x
//! ```
//!
//! # Cube Corners
//!
//! ```text
//!         7──────6         Corners:
//!        /│     /│           0=(0,0,0)  1=(1,0,0)  2=(1,1,0)  3=(0,1,0)
//!       4─┼────5 │           4=(0,0,1)  5=(1,0,1)  6=(1,1,1)  7=(0,1,1)
//!       │ 3────┼─2
//!       │/     │/          +Z
//!       0──────1            │  +Y
//!                           │ /
//!                           └───+X
//! ```
//!
//! Corners 0-3 form the `z = 0` face, corners 4-7 the `z = 1` face. This is
//! the classic marching cubes enumeration the triangle table is written for.

/// Smallest supported points per axis (a single cube).
pub const MIN_POINTS_PER_AXIS: usize = 2;

/// Largest supported points per axis.
pub const MAX_POINTS_PER_AXIS: usize = 256;

/// Default points per axis for new settings.
pub const DEFAULT_POINTS_PER_AXIS: usize = 30;

/// Largest follow-mode view distance, in chunks. Caps the candidate scan at
/// `(2 * MAX_VIEW_CHUNKS + 1)³` coordinates per pass.
pub const MAX_VIEW_CHUNKS: i32 = 32;

/// Viewer chunk coordinates are clamped to `±MAX_CHUNK_COORD` on each axis.
/// Chunk centres past `2^24` are no longer exact in `f32`.
pub const MAX_CHUNK_COORD: i32 = 1 << 24;

/// Upper bound on triangles a single cube configuration can emit.
pub const MAX_TRIANGLES_PER_CUBE: usize = 5;

/// Edges owned by each grid point (+X, +Y, +Z).
pub const EDGES_PER_POINT: usize = 3;

/// Total samples in a grid with `n` points per axis.
#[inline(always)]
pub const fn point_count(n: usize) -> usize {
  n * n * n
}

/// Total cubes in a grid with `n` points per axis.
#[inline(always)]
pub const fn cube_count(n: usize) -> usize {
  let cubes = n.saturating_sub(1);
  cubes * cubes * cubes
}

/// Convert 3D coordinates to a linear sample index.
///
/// Layout: X is minor (stride 1), Y is middle (stride n), Z is major
/// (stride n²).
#[inline(always)]
pub const fn coord_to_index(x: usize, y: usize, z: usize, n: usize) -> usize {
  (z * n + y) * n + x
}

/// Convert a linear sample index to 3D coordinates.
#[inline(always)]
pub const fn index_to_coord(idx: usize, n: usize) -> (usize, usize, usize) {
  let x = idx % n;
  let y = (idx / n) % n;
  let z = idx / (n * n);
  (x, y, z)
}

/// Convert a linear cube index to the cube's base coordinates.
///
/// Cubes are enumerated over `[0, n-2]` per axis with the same X-minor order
/// as samples.
#[inline(always)]
pub const fn cube_index_to_coord(idx: usize, n: usize) -> (usize, usize, usize) {
  index_to_coord(idx, n - 1)
}

/// Corner offsets relative to a cube's base coordinate.
pub const CORNER_OFFSETS: [[usize; 3]; 8] = [
  [0, 0, 0], // 0
  [1, 0, 0], // 1
  [1, 1, 0], // 2
  [0, 1, 0], // 3
  [0, 0, 1], // 4
  [1, 0, 1], // 5
  [1, 1, 1], // 6
  [0, 1, 1], // 7
];

/// Linear index offsets for the 8 cube corners in a grid of `n` points per
/// axis.
#[inline]
pub const fn corner_index_offsets(n: usize) -> [usize; 8] {
  let mut offsets = [0usize; 8];
  let mut corner = 0;
  while corner < 8 {
    let [dx, dy, dz] = CORNER_OFFSETS[corner];
    offsets[corner] = coord_to_index(dx, dy, dz, n);
    corner += 1;
  }
  offsets
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
