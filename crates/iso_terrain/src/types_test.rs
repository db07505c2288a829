use super::*;

#[test]
fn test_grid_rejects_bad_resolution() {
  assert_eq!(DensityGrid::new(1), Err(GridError::InvalidResolution(1)));
  assert_eq!(DensityGrid::new(257), Err(GridError::InvalidResolution(257)));
  assert!(DensityGrid::new(2).is_ok());
}

#[test]
fn test_from_samples_count_mismatch() {
  let err = DensityGrid::from_samples(3, vec![GridSample::default(); 26]).unwrap_err();
  assert_eq!(
    err,
    GridError::SampleCountMismatch {
      expected: 27,
      actual: 26
    }
  );
}

#[test]
fn test_from_densities_positions() {
  let densities: Vec<f32> = (0..27).map(|i| i as f32).collect();
  let grid = DensityGrid::from_densities(3, 0.5, &densities).unwrap();
  let s = grid.sample(UVec3::new(1, 2, 0));
  assert_eq!(s.position, Vec3::new(0.5, 1.0, 0.0));
  assert_eq!(s.density, (1 + 2 * 3) as f32);
}

#[test]
fn test_cube_densities_corner_order() {
  // density = index, so corner k reads its own linear offset
  let n = 3;
  let densities: Vec<f32> = (0..27).map(|i| i as f32).collect();
  let grid = DensityGrid::from_densities(n, 1.0, &densities).unwrap();
  let corners = grid.cube_densities(UVec3::ZERO);
  assert_eq!(corners, [0.0, 1.0, 4.0, 3.0, 9.0, 10.0, 13.0, 12.0]);
}

#[test]
fn test_resize_keeps_sample_count_consistent() {
  let mut grid = DensityGrid::new(4).unwrap();
  grid.resize(6).unwrap();
  assert_eq!(grid.points_per_axis(), 6);
  assert_eq!(grid.samples().len(), 216);
  grid.resize(2).unwrap();
  assert_eq!(grid.samples().len(), 8);
  assert!(grid.resize(0).is_err());
  assert_eq!(grid.points_per_axis(), 2);
}

#[test]
fn test_is_homogeneous() {
  let inside = DensityGrid::from_densities(2, 1.0, &[-1.0; 8]).unwrap();
  assert!(inside.is_homogeneous(0.0));

  let outside = DensityGrid::from_densities(2, 1.0, &[1.0; 8]).unwrap();
  assert!(outside.is_homogeneous(0.0));

  // Equality counts as outside
  let boundary = DensityGrid::from_densities(2, 1.0, &[0.0; 8]).unwrap();
  assert!(boundary.is_homogeneous(0.0));

  let mut mixed = [1.0f32; 8];
  mixed[5] = -1.0;
  let mixed = DensityGrid::from_densities(2, 1.0, &mixed).unwrap();
  assert!(!mixed.is_homogeneous(0.0));
}

#[test]
fn test_aabb_encapsulate() {
  let mut aabb = MinMaxAABB::empty();
  assert!(!aabb.is_valid());
  aabb.encapsulate(Vec3::new(1.0, -2.0, 3.0));
  aabb.encapsulate(Vec3::new(-1.0, 2.0, 0.0));
  assert!(aabb.is_valid());
  assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
  assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn test_mesh_output_well_formed() {
  let mut mesh = MeshOutput::new();
  assert!(mesh.is_empty());
  assert!(mesh.is_well_formed());

  mesh.vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
  mesh.indices = vec![0, 1, 2];
  assert!(mesh.is_well_formed());
  assert_eq!(mesh.triangle_count(), 1);
  assert_eq!(mesh.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);

  mesh.indices.push(3);
  assert!(!mesh.is_well_formed());
  mesh.indices.extend([0, 1]);
  assert!(!mesh.is_well_formed(), "index 3 is out of range");

  mesh.clear();
  assert!(mesh.is_empty());
  assert!(mesh.indices.is_empty());
}
