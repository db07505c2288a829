//! Globally unique edge identifiers within a density grid.
//!
//! Every grid point owns the three edges leaving it along +X, +Y and +Z. An
//! edge shared by up to four cubes therefore has exactly one owner, and any
//! cube touching it computes the same identifier:
//!
//! ```text
//! id = index(owner) * 3 + axis        axis: X = 0, Y = 1, Z = 2
//!
//!         +Z
//!          │
//!          │  +Y
//!          │ /
//!          │/
//!        owner ───── +X
//! ```
//!
//! Identifiers range over `[0, n³ · 3)`. Edges on the far faces (owner at
//! `n - 1` along the edge axis) are never crossed by any cube, so a grid has
//! at most `n³ · 3` distinct live edges.

use std::fmt;

use glam::{IVec3, UVec3};
use smallvec::SmallVec;

use crate::constants::{coord_to_index, point_count, EDGES_PER_POINT};
use crate::edge_table::{EDGE_AXIS, EDGE_BASE};

/// Grid axis an edge runs along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
  X = 0,
  Y = 1,
  Z = 2,
}

impl Axis {
  pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

  #[inline(always)]
  pub const fn index(self) -> usize {
    self as usize
  }

  #[inline]
  pub const fn from_index(index: usize) -> Option<Axis> {
    match index {
      0 => Some(Axis::X),
      1 => Some(Axis::Y),
      2 => Some(Axis::Z),
      _ => None,
    }
  }

  /// Unit step along this axis in grid coordinates.
  #[inline]
  pub const fn unit(self) -> UVec3 {
    match self {
      Axis::X => UVec3::X,
      Axis::Y => UVec3::Y,
      Axis::Z => UVec3::Z,
    }
  }

  pub const fn label(self) -> char {
    match self {
      Axis::X => 'X',
      Axis::Y => 'Y',
      Axis::Z => 'Z',
    }
  }
}

/// Identifier of a grid edge, unique within one grid resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(u32);

impl EdgeId {
  /// Encode the edge owned by `owner` along `axis` in a grid of `n` points
  /// per axis.
  #[inline(always)]
  pub fn encode(owner: UVec3, axis: Axis, n: usize) -> EdgeId {
    let point = coord_to_index(owner.x as usize, owner.y as usize, owner.z as usize, n);
    EdgeId((point * EDGES_PER_POINT + axis.index()) as u32)
  }

  /// Identifier of local edge `edge` (0..12) of the cube based at `cube`.
  #[inline(always)]
  pub fn for_cube_edge(cube: UVec3, edge: usize, n: usize) -> EdgeId {
    let [dx, dy, dz] = EDGE_BASE[edge];
    let owner = cube + UVec3::new(dx as u32, dy as u32, dz as u32);
    let axis = match EDGE_AXIS[edge] {
      0 => Axis::X,
      1 => Axis::Y,
      _ => Axis::Z,
    };
    EdgeId::encode(owner, axis, n)
  }

  /// Recover owner coordinate and axis. `None` if the id is out of range for
  /// `n`.
  #[inline]
  pub fn decode(self, n: usize) -> Option<(UVec3, Axis)> {
    let raw = self.0 as usize;
    if n == 0 || raw >= point_count(n) * EDGES_PER_POINT {
      return None;
    }
    let axis = Axis::from_index(raw % EDGES_PER_POINT)?;
    let point = raw / EDGES_PER_POINT;
    let x = point % n;
    let y = (point / n) % n;
    let z = point / (n * n);
    Some((UVec3::new(x as u32, y as u32, z as u32), axis))
  }

  /// Both endpoint coordinates of the edge.
  pub fn endpoints(self, n: usize) -> Option<(UVec3, UVec3)> {
    self.decode(n).map(|(owner, axis)| (owner, owner + axis.unit()))
  }

  /// Base coordinates of the cubes that share this edge and lie inside the
  /// grid (between one and four).
  pub fn adjacent_cubes(self, n: usize) -> SmallVec<[UVec3; 4]> {
    let Some((owner, axis)) = self.decode(n) else {
      return SmallVec::new();
    };
    let cubes = (n - 1) as i32;
    let (u, v) = match axis {
      Axis::X => (IVec3::Y, IVec3::Z),
      Axis::Y => (IVec3::X, IVec3::Z),
      Axis::Z => (IVec3::X, IVec3::Y),
    };
    let owner = owner.as_ivec3();
    [IVec3::ZERO, -u, -v, -u - v]
      .into_iter()
      .map(|offset| owner + offset)
      .filter(|c| c.cmpge(IVec3::ZERO).all() && c.cmplt(IVec3::splat(cubes)).all())
      .map(|c| c.as_uvec3())
      .collect()
  }

  #[inline(always)]
  pub const fn raw(self) -> u32 {
    self.0
  }

  #[inline(always)]
  pub const fn from_raw(raw: u32) -> EdgeId {
    EdgeId(raw)
  }

  /// Human readable form `"id <x,y,z>A"` for diagnostics.
  pub fn describe(self, n: usize) -> String {
    match self.decode(n) {
      Some((owner, axis)) => format!(
        "{} <{},{},{}>{}",
        self.0,
        owner.x,
        owner.y,
        owner.z,
        axis.label()
      ),
      None => format!("{} <out of range>", self.0),
    }
  }
}

impl fmt::Display for EdgeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[cfg(test)]
#[path = "edge_id_test.rs"]
mod edge_id_test;
