//! Marching cubes isosurface extraction.
//!
//! Converts a sampled [`DensityGrid`] into an indexed triangle mesh whose
//! vertices are shared across cube boundaries.
//!
//! # Processing Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        INPUT                                    │
//! │  grid: n³ samples        - (position, density) per point        │
//! │  iso: f32                - surface threshold                    │
//! │  buffers                 - append buffers sized for n           │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PASS 1: Edges (per point)                    │
//! │  For each owned edge (+X, +Y, +Z) inside the grid:              │
//! │    Skip unless endpoint densities straddle iso                  │
//! │    Interpolate crossing, push (edge id, position)               │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PASS 2: Triangles (per cube)                 │
//! │  Build 8-bit configuration from corner densities                │
//! │  Early-out for 0 / 255                                          │
//! │  Push each TRI_TABLE triple as 3 global edge ids                │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    ASSEMBLY                                     │
//! │  Dedup map edge id → vertex index (warn + drop repeats)         │
//! │  Remap triangle edge ids to vertex indices                      │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        OUTPUT                                   │
//! │  vertices: Vec<Vec3>     - one per straddling edge              │
//! │  indices: Vec<u32>       - 3 per triangle                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both passes are order independent. Triangle order in the output is not
//! deterministic.
//!
//! [`generate_serial`] walks cubes in order and deduplicates with a per-pass
//! map. It produces the same vertex and triangle sets and serves as the
//! reference for the parallel path.

pub mod assemble;
pub mod buffers;
pub mod corner_mask;
pub mod interpolate;
pub mod kernels;

use glam::{UVec3, Vec3};
use rustc_hash::FxHashMap;

pub use assemble::Assembled;
pub use buffers::ExtractionBuffers;

use crate::constants::{cube_count, cube_index_to_coord};
use crate::edge_id::{Axis, EdgeId};
use crate::edge_table::{triangles, EDGE_AXIS, EDGE_BASE};
use crate::error::ExtractError;
use crate::types::{DensityGrid, MeshOutput};

/// Interpolated crossing on one grid edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeVertex {
  pub id: EdgeId,
  pub position: Vec3,
}

/// Triangle expressed as global edge ids, before remapping to vertices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeTriangle {
  pub edges: [EdgeId; 3],
}

/// Extract the isosurface of `grid` at `iso` in parallel.
///
/// Fails without producing a mesh if either buffer overflows or the buffers
/// were sized for another resolution.
pub fn generate(
  grid: &DensityGrid,
  iso: f32,
  buffers: &mut ExtractionBuffers,
) -> Result<MeshOutput, ExtractError> {
  extract(grid, iso, buffers).map(|assembled| assembled.mesh)
}

/// Like [`generate`], also returning the duplicate edge ids found during
/// assembly.
#[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "marching_cubes::extract"))]
pub fn extract(
  grid: &DensityGrid,
  iso: f32,
  buffers: &mut ExtractionBuffers,
) -> Result<Assembled, ExtractError> {
  buffers.check_resolution(grid.points_per_axis())?;
  buffers.reset();

  let dispatched = kernels::emit_edges(grid, iso, &buffers.edges)
    .and_then(|()| kernels::emit_triangles(grid, iso, &buffers.triangles));
  if let Err(err) = dispatched {
    buffers.reset();
    return Err(err);
  }

  let edges = buffers.edges.drain();
  let tris = buffers.triangles.drain();
  assemble::assemble(grid, iso, edges, tris)
}

/// Single-threaded reference extraction.
///
/// Visits cubes in grid order. The first cube to reach an edge interpolates
/// its vertex and records it in the dedup map; later cubes reuse it.
pub fn generate_serial(grid: &DensityGrid, iso: f32) -> MeshOutput {
  let n = grid.points_per_axis();
  let mut mesh = MeshOutput::new();
  let mut lookup: FxHashMap<EdgeId, u32> = FxHashMap::default();

  for idx in 0..cube_count(n) {
    let (x, y, z) = cube_index_to_coord(idx, n);
    let cube = UVec3::new(x as u32, y as u32, z as u32);
    let densities = grid.cube_densities(cube);
    let config = corner_mask::build(&densities, iso);
    if corner_mask::is_homogeneous(config) {
      continue;
    }

    for tri in triangles(config) {
      for edge in tri {
        let edge = edge as usize;
        let id = EdgeId::for_cube_edge(cube, edge, n);
        let index = *lookup.entry(id).or_insert_with(|| {
          // Interpolate from the lower endpoint, matching the edge pass.
          let [dx, dy, dz] = EDGE_BASE[edge];
          let low = cube + UVec3::new(dx as u32, dy as u32, dz as u32);
          let a = grid.sample(low);
          let b = grid.sample(low + axis_unit(EDGE_AXIS[edge]));
          mesh.vertices.push(interpolate::crossing(a, b, iso));
          (mesh.vertices.len() - 1) as u32
        });
        mesh.indices.push(index);
      }
    }
  }

  mesh.recompute_bounds();
  mesh
}

#[inline(always)]
fn axis_unit(axis: usize) -> UVec3 {
  Axis::from_index(axis).map_or(UVec3::Z, Axis::unit)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;
