//! Batch extraction stage for chunk meshes.
//!
//! Stage pattern: Enqueue → Tick → Completions
//!
//! Each tick first samples every pending chunk's density grid in parallel
//! (grids are owned by the chunks). Extraction then runs chunk by chunk
//! through a single persistent [`ExtractionBuffers`] set, with the edge and
//! triangle passes fanning out over rayon inside each chunk. Peak buffer
//! memory is one worst-case set regardless of thread count or batch size.

use glam::{UVec3, Vec3};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use web_time::Instant;

use crate::chunk::{Chunk, ChunkCoord, ChunkStore, SlotId};
use crate::density::{DensityField, DensitySampler};
use crate::error::ExtractError;
use crate::marching_cubes::{self, ExtractionBuffers};

/// Sampling parameters shared by every job in a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleParams {
  pub dimensions: UVec3,
  pub bounds_size: f32,
  pub world_offset: Vec3,
  pub spacing: f32,
  pub iso_level: f32,
}

/// Request to (re)build the mesh of one chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtractionRequest {
  pub slot: SlotId,
  pub coord: ChunkCoord,
  pub centre: Vec3,
}

/// Geometry counts of a committed extraction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
  pub vertices: usize,
  pub triangles: usize,
  /// Repeated edge ids dropped during assembly.
  pub duplicates: usize,
  /// The grid was entirely inside or outside; kernels were skipped.
  pub homogeneous: bool,
}

/// Result of one job. On error the chunk keeps its previous mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractionCompletion {
  pub slot: SlotId,
  pub coord: ChunkCoord,
  pub outcome: Result<ExtractionSummary, ExtractError>,
  /// Density sampling time in microseconds.
  pub sample_time_us: u64,
  /// Extraction and assembly time in microseconds.
  pub mesh_time_us: u64,
}

pub struct ExtractionStage {
  /// Pending requests waiting to be processed
  pending: Vec<ExtractionRequest>,
  /// Completed results ready to be collected
  completed: Vec<ExtractionCompletion>,
  points_per_axis: usize,
  capacity_scale: usize,
  /// Shared by every job. `None` while released.
  buffers: Option<ExtractionBuffers>,
}

impl ExtractionStage {
  pub fn new(points_per_axis: usize) -> Self {
    Self {
      pending: Vec::new(),
      completed: Vec::new(),
      points_per_axis,
      capacity_scale: 1,
      buffers: None,
    }
  }

  /// Queue a chunk for extraction. A later request for the same slot in the
  /// same tick replaces the earlier one.
  pub fn enqueue(&mut self, slot: SlotId, coord: ChunkCoord, centre: Vec3) {
    self.pending.push(ExtractionRequest {
      slot,
      coord,
      centre,
    });
  }

  /// Switch resolution. Buffers sized for the old resolution are released and
  /// reallocated on the next dispatch.
  pub fn set_resolution(&mut self, points_per_axis: usize) {
    if points_per_axis != self.points_per_axis {
      self.points_per_axis = points_per_axis;
      self.release_buffers();
    }
  }

  /// Multiply buffer capacities, for retrying after a capacity error.
  pub fn set_capacity_scale(&mut self, scale: usize) {
    let scale = scale.max(1);
    if scale != self.capacity_scale {
      self.capacity_scale = scale;
      self.release_buffers();
    }
  }

  /// Drop the extraction buffers.
  pub fn release_buffers(&mut self) {
    if self.buffers.take().is_some() {
      tracing::debug!(points_per_axis = self.points_per_axis, "releasing extraction buffers");
    }
  }

  /// Number of live buffer sets: 0 while released, otherwise 1.
  pub fn buffers_allocated(&self) -> usize {
    usize::from(self.buffers.is_some())
  }

  pub fn points_per_axis(&self) -> usize {
    self.points_per_axis
  }

  /// Sample every pending request in parallel, then extract them one by one.
  /// Returns the number of jobs run this tick.
  #[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "extraction_stage::tick"))]
  pub fn tick<F: DensityField>(
    &mut self,
    sampler: &DensitySampler<F>,
    params: &SampleParams,
    store: &mut ChunkStore,
  ) -> usize {
    if self.pending.is_empty() {
      return 0;
    }
    self.set_resolution(params.dimensions.x as usize);

    let requests: FxHashMap<SlotId, ExtractionRequest> = std::mem::take(&mut self.pending)
      .into_iter()
      .map(|req| (req.slot, req))
      .collect();
    let slots: Vec<SlotId> = requests.keys().copied().collect();
    let mut jobs: Vec<(&ExtractionRequest, &mut Chunk)> = store
      .chunks_mut(&slots)
      .into_iter()
      .filter_map(|(slot, chunk)| requests.get(&slot).map(|request| (request, chunk)))
      .collect();
    if jobs.is_empty() {
      return 0;
    }

    let sampled: Vec<(Result<(), ExtractError>, u64)> = jobs
      .par_iter_mut()
      .map(|(request, chunk)| sample_job(sampler, params, *request, &mut **chunk))
      .collect();

    let (points_per_axis, capacity_scale) = (self.points_per_axis, self.capacity_scale);
    let buffers = self
      .buffers
      .get_or_insert_with(|| ExtractionBuffers::with_capacity_scale(points_per_axis, capacity_scale));

    let count = jobs.len();
    for ((request, chunk), (filled, sample_time_us)) in jobs.into_iter().zip(sampled) {
      let completion = extract_job(params, request, chunk, buffers, filled, sample_time_us);
      self.completed.push(completion);
    }
    count
  }

  /// Take all completed jobs.
  pub fn drain_completions(&mut self) -> Vec<ExtractionCompletion> {
    std::mem::take(&mut self.completed)
  }

  pub fn pending_count(&self) -> usize {
    self.pending.len()
  }

  pub fn completed_count(&self) -> usize {
    self.completed.len()
  }

  /// True when no work remains.
  pub fn is_idle(&self) -> bool {
    self.pending.is_empty() && self.completed.is_empty()
  }
}

fn sample_job<F: DensityField>(
  sampler: &DensitySampler<F>,
  params: &SampleParams,
  request: &ExtractionRequest,
  chunk: &mut Chunk,
) -> (Result<(), ExtractError>, u64) {
  let start = Instant::now();
  let filled = sampler.fill(
    &mut chunk.grid,
    params.dimensions,
    params.bounds_size,
    params.world_offset,
    request.centre,
    params.spacing,
  );
  (filled.map_err(ExtractError::from), start.elapsed().as_micros() as u64)
}

fn extract_job(
  params: &SampleParams,
  request: &ExtractionRequest,
  chunk: &mut Chunk,
  buffers: &mut ExtractionBuffers,
  filled: Result<(), ExtractError>,
  sample_time_us: u64,
) -> ExtractionCompletion {
  let start = Instant::now();
  let outcome = filled.and_then(|()| {
    if chunk.grid.is_homogeneous(params.iso_level) {
      chunk.mesh.clear();
      return Ok(ExtractionSummary {
        homogeneous: true,
        ..Default::default()
      });
    }
    let assembled = marching_cubes::extract(&chunk.grid, params.iso_level, buffers)?;
    let summary = ExtractionSummary {
      vertices: assembled.mesh.vertices.len(),
      triangles: assembled.mesh.triangle_count(),
      duplicates: assembled.duplicates.len(),
      homogeneous: false,
    };
    chunk.mesh = assembled.mesh;
    Ok(summary)
  });
  let mesh_time_us = start.elapsed().as_micros() as u64;

  if outcome.is_ok() {
    chunk.generation += 1;
  }
  tracing::trace!(
    coord = %request.coord,
    sample_us = sample_time_us,
    mesh_us = mesh_time_us,
    ok = outcome.is_ok(),
    "extracted chunk"
  );

  ExtractionCompletion {
    slot: request.slot,
    coord: request.coord,
    outcome,
    sample_time_us,
    mesh_time_us,
  }
}

#[cfg(test)]
#[path = "extraction_stage_test.rs"]
mod extraction_stage_test;
