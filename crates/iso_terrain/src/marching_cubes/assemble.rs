//! Assembly: edge records and edge-id triangles into an indexed mesh.
//!
//! ```text
//!  edge records ──► sort by id ──► dedup map (id → vertex index) ──► vertices
//!                                          │
//!  edge-id triangles ──────────────────────┴─► remap ──► indices
//! ```
//!
//! A repeated edge id is a table or kernel bug. It is logged with enough
//! context to find the offending cubes, the repeat is dropped and assembly
//! continues, so the mesh stays free of duplicate vertices.

use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

use super::{corner_mask, EdgeTriangle, EdgeVertex};
use crate::edge_id::EdgeId;
use crate::edge_table::{triangles, EDGE_TABLE};
use crate::error::ExtractError;
use crate::types::{DensityGrid, MeshOutput};

/// Assembled mesh plus the edge ids that were emitted more than once.
#[derive(Clone, Debug, Default)]
pub struct Assembled {
  pub mesh: MeshOutput,
  pub duplicates: Vec<EdgeId>,
}

/// Build the indexed mesh. Vertex order follows ascending edge id.
#[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "marching_cubes::assemble"))]
pub fn assemble(
  grid: &DensityGrid,
  iso: f32,
  mut edges: Vec<EdgeVertex>,
  tris: Vec<EdgeTriangle>,
) -> Result<Assembled, ExtractError> {
  edges.sort_unstable_by_key(|e| e.id);

  let mut lookup: FxHashMap<EdgeId, u32> =
    FxHashMap::with_capacity_and_hasher(edges.len(), Default::default());
  let mut out = Assembled::default();
  out.mesh.vertices.reserve(edges.len());

  for edge in edges {
    match lookup.entry(edge.id) {
      Entry::Occupied(_) => {
        report_duplicate(grid, iso, edge.id);
        out.duplicates.push(edge.id);
      }
      Entry::Vacant(slot) => {
        slot.insert(out.mesh.vertices.len() as u32);
        out.mesh.vertices.push(edge.position);
      }
    }
  }

  out.mesh.indices.reserve(tris.len() * 3);
  for tri in tris {
    for id in tri.edges {
      let index = lookup.get(&id).ok_or(ExtractError::MissingEdge(id))?;
      out.mesh.indices.push(*index);
    }
  }

  out.mesh.recompute_bounds();
  Ok(out)
}

/// Log a duplicate edge with its endpoints and every cube sharing it.
pub(crate) fn report_duplicate(grid: &DensityGrid, iso: f32, id: EdgeId) {
  let n = grid.points_per_axis();
  let Some((a, b)) = id.endpoints(n) else {
    tracing::warn!(edge = %id, "duplicate edge id outside the grid");
    return;
  };

  let cubes: Vec<String> = id
    .adjacent_cubes(n)
    .into_iter()
    .map(|cube| {
      let config = corner_mask::build(&grid.cube_densities(cube), iso);
      let tris: Vec<[u8; 3]> = triangles(config).collect();
      format!(
        "cube <{},{},{}> config {:#010b} edges {:#014b} triangles {:?}",
        cube.x, cube.y, cube.z, config, EDGE_TABLE[config as usize], tris
      )
    })
    .collect();

  tracing::warn!(
    edge = %id.describe(n),
    density_a = grid.sample(a).density,
    density_b = grid.sample(b).density,
    cubes = ?cubes,
    "duplicate edge id, dropping repeated vertex"
  );
}
