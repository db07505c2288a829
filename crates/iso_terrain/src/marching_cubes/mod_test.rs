use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::constants::{point_count, CORNER_OFFSETS};
use crate::edge_table::{triangle_count, EDGE_TABLE};
use crate::error::BufferKind;

/// Grid with `-1` on the `z = 0` plane and `+1` everywhere else.
fn bottom_plane_grid(n: usize) -> DensityGrid {
  let densities: Vec<f32> = (0..point_count(n))
    .map(|idx| if idx < n * n { -1.0 } else { 1.0 })
    .collect();
  DensityGrid::from_densities(n, 1.0, &densities).unwrap()
}

fn random_grid(n: usize, seed: u64) -> DensityGrid {
  let mut rng = StdRng::seed_from_u64(seed);
  let densities: Vec<f32> = (0..point_count(n))
    .map(|_| rng.random_range(-1.0f32..1.0))
    .collect();
  DensityGrid::from_densities(n, 1.0, &densities).unwrap()
}

fn sphere_grid(n: usize, radius: f32) -> DensityGrid {
  let center = Vec3::splat((n - 1) as f32 * 0.5);
  let densities: Vec<f32> = (0..point_count(n))
    .map(|idx| {
      let (x, y, z) = crate::constants::index_to_coord(idx, n);
      (Vec3::new(x as f32, y as f32, z as f32) - center).length() - radius
    })
    .collect();
  DensityGrid::from_densities(n, 1.0, &densities).unwrap()
}

fn run(grid: &DensityGrid, iso: f32) -> Assembled {
  let mut buffers = ExtractionBuffers::new(grid.points_per_axis());
  extract(grid, iso, &mut buffers).unwrap()
}

fn straddling_edges(grid: &DensityGrid, iso: f32) -> usize {
  let n = grid.points_per_axis() as u32;
  let mut count = 0;
  for z in 0..n {
    for y in 0..n {
      for x in 0..n {
        let p = UVec3::new(x, y, z);
        for axis in crate::edge_id::Axis::ALL {
          let q = p + axis.unit();
          if q.max_element() >= n {
            continue;
          }
          if interpolate::straddles(grid.sample(p).density, grid.sample(q).density, iso) {
            count += 1;
          }
        }
      }
    }
  }
  count
}

type Key = [u32; 3];

fn key(v: Vec3) -> Key {
  [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()]
}

/// Vertex positions and triangles (as rotated position triples) in a
/// canonical order, so meshes with different index orders compare equal.
fn canonical(mesh: &MeshOutput) -> (Vec<Key>, Vec<[Key; 3]>) {
  let mut vertices: Vec<Key> = mesh.vertices.iter().map(|&v| key(v)).collect();
  vertices.sort_unstable();

  let mut tris: Vec<[Key; 3]> = mesh
    .triangles()
    .map(|t| {
      let k = t.map(|i| key(mesh.vertices[i as usize]));
      let start = (0..3).min_by_key(|&i| k[i]).unwrap_or(0);
      [k[start], k[(start + 1) % 3], k[(start + 2) % 3]]
    })
    .collect();
  tris.sort_unstable();
  (vertices, tris)
}

#[test]
fn test_single_cube_horizontal_split() {
  let grid =
    DensityGrid::from_densities(2, 1.0, &[-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0]).unwrap();
  let assembled = run(&grid, 0.0);
  let mesh = &assembled.mesh;

  assert_eq!(mesh.vertices.len(), 4);
  assert_eq!(mesh.triangle_count(), 2);
  assert!(assembled.duplicates.is_empty());
  for v in &mesh.vertices {
    assert!((v.z - 0.5).abs() < 1e-6, "Vertex {:?} should sit at z = 0.5", v);
  }

  let mut corners: Vec<(i32, i32)> = mesh
    .vertices
    .iter()
    .map(|v| (v.x as i32, v.y as i32))
    .collect();
  corners.sort_unstable();
  assert_eq!(corners, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);

  // Flat quad: both triangles share the diagonal
  let mut used = std::collections::HashSet::new();
  for tri in mesh.triangles() {
    used.extend(tri);
  }
  assert_eq!(used.len(), 4);
}

#[test]
fn test_two_by_two_grid_horizontal_split() {
  let grid = bottom_plane_grid(3);
  let assembled = run(&grid, 0.0);
  assert_eq!(assembled.mesh.vertices.len(), 9);
  assert_eq!(assembled.mesh.triangle_count(), 8);
  assert!(assembled
    .mesh
    .vertices
    .iter()
    .all(|v| (v.z - 0.5).abs() < 1e-6));
}

#[test]
fn test_uniform_fields_are_empty() {
  for density in [-3.0f32, 3.0, 0.0] {
    let grid = DensityGrid::from_densities(6, 1.0, &vec![density; 216]).unwrap();
    let mesh = run(&grid, 0.0).mesh;
    assert!(mesh.is_empty(), "Uniform {} should be empty", density);
    assert!(mesh.indices.is_empty());
    assert!(generate_serial(&grid, 0.0).is_empty());
  }
}

#[test]
fn test_every_configuration_is_well_formed() {
  let mut rng = StdRng::seed_from_u64(7);
  let mut buffers = ExtractionBuffers::new(2);

  for config in 1..=254u8 {
    let densities: Vec<f32> = (0..8)
      .map(|corner| {
        let magnitude = rng.random_range(0.1f32..2.0);
        if config & (1 << corner) != 0 {
          -magnitude
        } else {
          magnitude
        }
      })
      .collect();
    let grid = DensityGrid::from_densities(2, 1.0, &densities).unwrap();
    let mesh = generate(&grid, 0.0, &mut buffers).unwrap();

    assert!(mesh.is_well_formed(), "Config {} is malformed", config);
    assert_eq!(
      mesh.vertices.len(),
      EDGE_TABLE[config as usize].count_ones() as usize,
      "Config {} vertex count",
      config
    );
    assert_eq!(mesh.triangle_count(), triangle_count(config));

    // Vertices stay inside the unit cube
    for v in &mesh.vertices {
      assert!(v.cmpge(Vec3::ZERO).all() && v.cmple(Vec3::ONE).all());
    }
  }
}

#[test]
fn test_vertex_count_matches_straddling_edges() {
  for seed in 0..4 {
    let grid = random_grid(9, seed);
    let assembled = run(&grid, 0.0);
    assert!(assembled.duplicates.is_empty());
    assert!(assembled.mesh.is_well_formed());
    assert_eq!(assembled.mesh.vertices.len(), straddling_edges(&grid, 0.0));

    let mut keys: Vec<Key> = assembled.mesh.vertices.iter().map(|&v| key(v)).collect();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), assembled.mesh.vertices.len());
  }
}

#[test]
fn test_every_vertex_is_referenced() {
  let grid = random_grid(8, 42);
  let mesh = run(&grid, 0.0).mesh;
  let mut referenced = vec![false; mesh.vertices.len()];
  for &i in &mesh.indices {
    referenced[i as usize] = true;
  }
  assert!(referenced.into_iter().all(|r| r));
}

#[test]
fn test_parallel_matches_serial() {
  for (seed, iso) in [(1u64, 0.0f32), (2, 0.3), (3, -0.5)] {
    let grid = random_grid(10, seed);
    let parallel = run(&grid, iso).mesh;
    let serial = generate_serial(&grid, iso);
    assert_eq!(parallel.vertices.len(), serial.vertices.len());
    assert_eq!(parallel.triangle_count(), serial.triangle_count());
    assert_eq!(canonical(&parallel), canonical(&serial));
  }
}

#[test]
fn test_parallel_vertex_order_is_stable() {
  let grid = random_grid(12, 9);
  let a = run(&grid, 0.0).mesh;
  let b = run(&grid, 0.0).mesh;
  assert_eq!(a.vertices, b.vertices);
}

#[test]
fn test_sphere_vertices_near_radius() {
  let radius = 5.0;
  let grid = sphere_grid(16, radius);
  let mesh = run(&grid, 0.0).mesh;
  assert!(!mesh.is_empty());
  let center = Vec3::splat(7.5);
  for v in &mesh.vertices {
    let d = (*v - center).length();
    assert!((d - radius).abs() < 0.5, "Vertex {:?} at distance {}", v, d);
  }
  assert!(mesh.bounds.is_valid());
  assert!(mesh.bounds.min.cmpge(Vec3::splat(2.0)).all());
  assert!(mesh.bounds.max.cmple(Vec3::splat(13.0)).all());
}

#[test]
fn test_edge_capacity_exceeded() {
  let grid = bottom_plane_grid(4);
  let mut buffers = ExtractionBuffers::with_capacities(4, 3, 1000);
  let err = extract(&grid, 0.0, &mut buffers).unwrap_err();
  assert_eq!(
    err,
    ExtractError::CapacityExceeded {
      buffer: BufferKind::Edges,
      capacity: 3
    }
  );
}

#[test]
fn test_triangle_capacity_exceeded() {
  let grid = bottom_plane_grid(4);
  let mut buffers = ExtractionBuffers::with_capacities(4, 1000, 5);
  let err = extract(&grid, 0.0, &mut buffers).unwrap_err();
  assert_eq!(
    err,
    ExtractError::CapacityExceeded {
      buffer: BufferKind::Triangles,
      capacity: 5
    }
  );
}

#[test]
fn test_buffers_reusable_across_dispatches() {
  let mut buffers = ExtractionBuffers::new(5);
  let first = generate(&random_grid(5, 11), 0.0, &mut buffers).unwrap();
  let empty = DensityGrid::from_densities(5, 1.0, &[1.0; 125]).unwrap();
  assert!(generate(&empty, 0.0, &mut buffers).unwrap().is_empty());
  let again = generate(&random_grid(5, 11), 0.0, &mut buffers).unwrap();
  assert_eq!(first.vertices, again.vertices);
}

#[test]
fn test_resolution_mismatch() {
  let grid = bottom_plane_grid(4);
  let mut buffers = ExtractionBuffers::new(5);
  assert_eq!(
    extract(&grid, 0.0, &mut buffers).unwrap_err(),
    ExtractError::ResolutionMismatch {
      expected: 5,
      actual: 4
    }
  );

  assert!(buffers.ensure_resolution(4));
  assert!(!buffers.ensure_resolution(4));
  assert!(extract(&grid, 0.0, &mut buffers).is_ok());
}

#[test]
fn test_default_capacities() {
  let buffers = ExtractionBuffers::new(30);
  assert_eq!(buffers.edge_capacity(), 27_000 * 3);
  assert_eq!(buffers.triangle_capacity(), 29 * 29 * 29 * 5);
}

#[test]
fn test_duplicate_edge_dropped_and_reported() {
  let grid = bottom_plane_grid(2);
  let id = EdgeId::encode(UVec3::ZERO, crate::edge_id::Axis::Z, 2);
  let edges = vec![
    EdgeVertex {
      id,
      position: Vec3::new(0.0, 0.0, 0.5),
    },
    EdgeVertex {
      id,
      position: Vec3::new(0.0, 0.0, 0.25),
    },
  ];
  let tris = vec![EdgeTriangle {
    edges: [id, id, id],
  }];
  let assembled = assemble::assemble(&grid, 0.0, edges, tris).unwrap();
  assert_eq!(assembled.duplicates, vec![id]);
  assert_eq!(assembled.mesh.vertices.len(), 1);
  assert_eq!(assembled.mesh.indices, vec![0, 0, 0]);
}

#[test]
fn test_missing_edge_is_an_error() {
  let grid = bottom_plane_grid(2);
  let id = EdgeId::from_raw(5);
  let err = assemble::assemble(&grid, 0.0, Vec::new(), vec![EdgeTriangle { edges: [id; 3] }])
    .unwrap_err();
  assert_eq!(err, ExtractError::MissingEdge(id));
}

#[test]
fn test_positions_follow_sample_positions() {
  // Scaled and offset samples move the surface accordingly
  let n = 2;
  let origin = Vec3::new(10.0, -4.0, 2.0);
  let spacing = 0.5;
  let samples: Vec<_> = (0..8)
    .map(|corner| {
      let [x, y, z] = CORNER_OFFSETS[[0, 1, 3, 2, 4, 5, 7, 6][corner]];
      let position = origin + Vec3::new(x as f32, y as f32, z as f32) * spacing;
      crate::types::GridSample::new(position, if z == 0 { -1.0 } else { 3.0 })
    })
    .collect();
  let grid = DensityGrid::from_samples(n, samples).unwrap();
  let mesh = run(&grid, 0.0).mesh;
  assert_eq!(mesh.vertices.len(), 4);
  for v in &mesh.vertices {
    assert!((v.z - (origin.z + 0.125)).abs() < 1e-6);
  }
}
