use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;
use crate::constants::cube_count;

#[test]
fn test_encode_decode_roundtrip() {
  for n in [2usize, 3, 5] {
    for raw in 0..(point_count(n) * EDGES_PER_POINT) as u32 {
      let id = EdgeId::from_raw(raw);
      let (owner, axis) = id.decode(n).expect("in range");
      assert_eq!(EdgeId::encode(owner, axis, n), id);
    }
  }
}

#[test]
fn test_decode_out_of_range() {
  let n = 4;
  let limit = (point_count(n) * EDGES_PER_POINT) as u32;
  assert!(EdgeId::from_raw(limit - 1).decode(n).is_some());
  assert!(EdgeId::from_raw(limit).decode(n).is_none());
  assert!(EdgeId::from_raw(0).decode(0).is_none());
}

#[test]
fn test_encoding_layout() {
  let n = 4;
  assert_eq!(EdgeId::encode(UVec3::ZERO, Axis::X, n).raw(), 0);
  assert_eq!(EdgeId::encode(UVec3::ZERO, Axis::Z, n).raw(), 2);
  assert_eq!(EdgeId::encode(UVec3::new(1, 0, 0), Axis::X, n).raw(), 3);
  assert_eq!(EdgeId::encode(UVec3::new(0, 1, 0), Axis::Y, n).raw(), (n * 3 + 1) as u32);
}

#[test]
fn test_describe() {
  let n = 3;
  let id = EdgeId::encode(UVec3::new(1, 2, 0), Axis::Y, n);
  assert_eq!(id.describe(n), format!("{} <1,2,0>Y", id.raw()));
  assert!(EdgeId::from_raw(u32::MAX).describe(n).contains("out of range"));
}

#[test]
fn test_endpoints_differ_by_axis_unit() {
  let n = 5;
  let id = EdgeId::encode(UVec3::new(2, 3, 1), Axis::Z, n);
  let (a, b) = id.endpoints(n).unwrap();
  assert_eq!(a, UVec3::new(2, 3, 1));
  assert_eq!(b, UVec3::new(2, 3, 2));
}

#[test]
fn test_cube_edges_are_distinct() {
  let n = 4;
  for idx in 0..cube_count(n) {
    let (x, y, z) = crate::constants::cube_index_to_coord(idx, n);
    let cube = UVec3::new(x as u32, y as u32, z as u32);
    let mut ids: Vec<_> = (0..12).map(|e| EdgeId::for_cube_edge(cube, e, n)).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 12);
  }
}

#[test]
fn test_interior_edge_has_four_cubes() {
  let n = 4;
  let id = EdgeId::encode(UVec3::new(1, 1, 1), Axis::X, n);
  let cubes = id.adjacent_cubes(n);
  assert_eq!(cubes.len(), 4);
  for cube in cubes {
    let hits = (0..12)
      .filter(|&e| EdgeId::for_cube_edge(cube, e, n) == id)
      .count();
    assert_eq!(hits, 1, "Cube {:?} should see the edge exactly once", cube);
  }
}

#[test]
fn test_corner_edge_has_one_cube() {
  let n = 3;
  let id = EdgeId::encode(UVec3::ZERO, Axis::Y, n);
  assert_eq!(id.adjacent_cubes(n).as_slice(), &[UVec3::ZERO]);
}

/// Neighbouring cubes that share an edge must agree on its id.
#[test]
fn test_shared_edges_agree_randomized() {
  let mut rng = StdRng::seed_from_u64(2024);
  for _ in 0..500 {
    let n: usize = rng.random_range(3..12);
    let cubes = (n - 1) as u32;
    let cube = UVec3::new(
      rng.random_range(0..cubes),
      rng.random_range(0..cubes),
      rng.random_range(0..cubes),
    );
    let edge = rng.random_range(0..12usize);
    let id = EdgeId::for_cube_edge(cube, edge, n);

    let neighbours = id.adjacent_cubes(n);
    assert!(neighbours.contains(&cube));
    for other in neighbours {
      let found = (0..12).any(|e| EdgeId::for_cube_edge(other, e, n) == id);
      assert!(found, "Cube {:?} does not reach edge {}", other, id.describe(n));
    }
  }
}
