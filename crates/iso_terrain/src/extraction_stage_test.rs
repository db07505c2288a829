use glam::IVec3;

use super::*;
use crate::density::DensityShape;
use crate::error::BufferKind;

fn params(n: u32) -> SampleParams {
  SampleParams {
    dimensions: UVec3::splat(n),
    bounds_size: 8.0,
    world_offset: Vec3::ZERO,
    spacing: 8.0 / (n - 1) as f32,
    iso_level: 0.0,
  }
}

fn sphere_sampler(radius: f32) -> DensitySampler<crate::density::DensityFunction> {
  DensitySampler::new(
    DensityShape::Sphere {
      radius,
      center: Vec3::ZERO,
    }
    .build()
    .unwrap(),
  )
}

#[test]
fn test_single_request() {
  let mut store = ChunkStore::new();
  let mut stage = ExtractionStage::new(9);
  let slot = store.materialize(IVec3::ZERO, 9).unwrap().slot();

  stage.enqueue(slot, IVec3::ZERO, Vec3::ZERO);
  assert_eq!(stage.pending_count(), 1);

  let processed = stage.tick(&sphere_sampler(3.0), &params(9), &mut store);
  assert_eq!(processed, 1);
  assert_eq!(stage.pending_count(), 0);
  assert_eq!(stage.completed_count(), 1);

  let completions = stage.drain_completions();
  let summary = completions[0].outcome.clone().unwrap();
  assert!(summary.vertices > 0);
  assert!(!summary.homogeneous);
  assert_eq!(summary.duplicates, 0);

  let chunk = store.get(slot).unwrap();
  assert_eq!(chunk.mesh.vertices.len(), summary.vertices);
  assert_eq!(chunk.generation, 1);
  assert!(stage.is_idle());
}

#[test]
fn test_many_requests_share_one_buffer_set() {
  let mut store = ChunkStore::new();
  let mut stage = ExtractionStage::new(5);
  for x in 0..20 {
    let coord = IVec3::new(x, 0, 0);
    let slot = store.materialize(coord, 5).unwrap().slot();
    stage.enqueue(slot, coord, coord.as_vec3() * 8.0);
  }

  let processed = stage.tick(&sphere_sampler(12.0), &params(5), &mut store);
  assert_eq!(processed, 20);
  assert_eq!(stage.buffers_allocated(), 1);

  let completions = stage.drain_completions();
  assert_eq!(completions.len(), 20);
  assert!(completions.iter().all(|c| c.outcome.is_ok()));

  // Chunks far from the sphere are homogeneous
  let far = completions
    .iter()
    .find(|c| c.coord == IVec3::new(19, 0, 0))
    .unwrap();
  assert!(far.outcome.as_ref().unwrap().homogeneous);
}

#[test]
fn test_wide_thread_pool_reuses_single_buffer_set() {
  let pool = rayon::ThreadPoolBuilder::new().num_threads(8).build().unwrap();
  let sampler = sphere_sampler(20.0);

  let mut store = ChunkStore::new();
  let mut stage = ExtractionStage::new(9);
  let coords: Vec<IVec3> = (-2..=2)
    .flat_map(|x| (-2..=2).map(move |y| IVec3::new(x, y, 0)))
    .collect();
  for &coord in &coords {
    let slot = store.materialize(coord, 9).unwrap().slot();
    stage.enqueue(slot, coord, coord.as_vec3() * 8.0);
  }
  let processed = pool.install(|| stage.tick(&sampler, &params(9), &mut store));
  assert_eq!(processed, coords.len());
  assert_eq!(stage.buffers_allocated(), 1);

  // Meshes built through the shared buffers match a fresh stage per chunk
  for completion in stage.drain_completions() {
    assert!(completion.outcome.is_ok());
    let mut lone_store = ChunkStore::new();
    let mut lone = ExtractionStage::new(9);
    let slot = lone_store.materialize(completion.coord, 9).unwrap().slot();
    lone.enqueue(slot, completion.coord, completion.coord.as_vec3() * 8.0);
    lone.tick(&sampler, &params(9), &mut lone_store);
    assert_eq!(
      store.get(completion.slot).unwrap().mesh,
      lone_store.get(slot).unwrap().mesh,
      "coord {}",
      completion.coord
    );
  }
}

#[test]
fn test_duplicate_slot_requests_run_once() {
  let mut store = ChunkStore::new();
  let mut stage = ExtractionStage::new(5);
  let slot = store.materialize(IVec3::ZERO, 5).unwrap().slot();
  stage.enqueue(slot, IVec3::ZERO, Vec3::ZERO);
  stage.enqueue(slot, IVec3::ZERO, Vec3::ZERO);
  assert_eq!(stage.tick(&sphere_sampler(2.0), &params(5), &mut store), 1);
  assert_eq!(store.get(slot).unwrap().generation, 1);
}

#[test]
fn test_capacity_failure_keeps_previous_mesh() {
  let mut store = ChunkStore::new();
  let mut stage = ExtractionStage::new(9);
  let slot = store.materialize(IVec3::ZERO, 9).unwrap().slot();

  stage.enqueue(slot, IVec3::ZERO, Vec3::ZERO);
  stage.tick(&sphere_sampler(3.0), &params(9), &mut store);
  stage.drain_completions();
  let before = store.get(slot).unwrap().mesh.clone();

  // A closure field that crosses the iso level on nearly every edge
  let noisy = DensitySampler::new(|p: Vec3| {
    if (p.x + p.y + p.z).round() as i32 % 2 == 0 {
      1.0
    } else {
      -1.0
    }
  });
  let mut tiny = ExtractionStage::new(9);
  tiny.buffers = Some(ExtractionBuffers::with_capacities(9, 4, 4));
  tiny.enqueue(slot, IVec3::ZERO, Vec3::ZERO);
  tiny.tick(&noisy, &params(9), &mut store);

  let completion = tiny.drain_completions().remove(0);
  assert!(matches!(
    completion.outcome,
    Err(ExtractError::CapacityExceeded {
      buffer: BufferKind::Edges,
      ..
    })
  ));
  let chunk = store.get(slot).unwrap();
  assert_eq!(chunk.mesh, before, "Failed dispatch commits nothing");
  assert_eq!(chunk.generation, 1);
}

#[test]
fn test_resolution_change_releases_buffers() {
  let mut store = ChunkStore::new();
  let mut stage = ExtractionStage::new(5);
  let slot = store.materialize(IVec3::ZERO, 5).unwrap().slot();
  stage.enqueue(slot, IVec3::ZERO, Vec3::ZERO);
  stage.tick(&sphere_sampler(2.0), &params(5), &mut store);
  assert_eq!(stage.buffers_allocated(), 1);

  stage.set_resolution(7);
  assert_eq!(stage.buffers_allocated(), 0);

  stage.enqueue(slot, IVec3::ZERO, Vec3::ZERO);
  stage.tick(&sphere_sampler(2.0), &params(7), &mut store);
  let completion = stage.drain_completions().remove(0);
  assert!(completion.outcome.is_ok());
  assert_eq!(store.get(slot).unwrap().grid.points_per_axis(), 7);
}

#[test]
fn test_unknown_slot_is_skipped() {
  let mut store = ChunkStore::new();
  let mut stage = ExtractionStage::new(5);
  let slot = store.materialize(IVec3::ZERO, 5).unwrap().slot();
  store.destroy(slot);
  stage.enqueue(slot, IVec3::ZERO, Vec3::ZERO);
  assert_eq!(stage.tick(&sphere_sampler(2.0), &params(5), &mut store), 0);
  assert!(stage.drain_completions().is_empty());
}
