//! Order-independent extraction kernels.
//!
//! Both passes run one rayon task per grid point (edges) or per cube
//! (triangles). No task reads another task's output; results meet only in
//! the append buffers.

use glam::UVec3;
use rayon::prelude::*;

use super::{corner_mask, interpolate, EdgeTriangle, EdgeVertex};
use crate::append_buffer::{AppendBuffer, AppendOverflow};
use crate::constants::{cube_count, cube_index_to_coord, index_to_coord, point_count};
use crate::edge_id::{Axis, EdgeId};
use crate::edge_table::triangles;
use crate::error::{BufferKind, ExtractError};
use crate::types::DensityGrid;

/// Emit one interpolated vertex for every owned edge that straddles `iso`.
#[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "marching_cubes::emit_edges"))]
pub fn emit_edges(
  grid: &DensityGrid,
  iso: f32,
  out: &AppendBuffer<EdgeVertex>,
) -> Result<(), ExtractError> {
  let n = grid.points_per_axis();
  let samples = grid.samples();
  let last = (n - 1) as u32;

  (0..point_count(n))
    .into_par_iter()
    .try_for_each(|idx| -> Result<(), AppendOverflow> {
      let (x, y, z) = index_to_coord(idx, n);
      let owner = UVec3::new(x as u32, y as u32, z as u32);
      let a = samples[idx];

      for axis in Axis::ALL {
        if owner[axis.index()] == last {
          continue;
        }
        let b = grid.sample(owner + axis.unit());
        if !interpolate::straddles(a.density, b.density, iso) {
          continue;
        }
        out.push(EdgeVertex {
          id: EdgeId::encode(owner, axis, n),
          position: interpolate::crossing(a, b, iso),
        })?;
      }
      Ok(())
    })
    .map_err(|AppendOverflow { capacity }| ExtractError::CapacityExceeded {
      buffer: BufferKind::Edges,
      capacity,
    })
}

/// Emit the triangles of every cube as triples of global edge ids.
#[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "marching_cubes::emit_triangles"))]
pub fn emit_triangles(
  grid: &DensityGrid,
  iso: f32,
  out: &AppendBuffer<EdgeTriangle>,
) -> Result<(), ExtractError> {
  let n = grid.points_per_axis();

  (0..cube_count(n))
    .into_par_iter()
    .try_for_each(|idx| -> Result<(), AppendOverflow> {
      let (x, y, z) = cube_index_to_coord(idx, n);
      let cube = UVec3::new(x as u32, y as u32, z as u32);
      let config = corner_mask::build(&grid.cube_densities(cube), iso);
      if corner_mask::is_homogeneous(config) {
        return Ok(());
      }
      for tri in triangles(config) {
        out.push(EdgeTriangle {
          edges: tri.map(|edge| EdgeId::for_cube_edge(cube, edge as usize, n)),
        })?;
      }
      Ok(())
    })
    .map_err(|AppendOverflow { capacity }| ExtractError::CapacityExceeded {
      buffer: BufferKind::Triangles,
      capacity,
    })
}
