//! Per-tick chunk streaming around a viewer, or over a fixed map.
//!
//! # Follow mode tick
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │ 1. viewer coord = round(viewer / bounds_size)                  │
//! │ 2. retire active chunks whose bounds are beyond view distance  │
//! │ 3. scan coords within ceil(view_distance / bounds_size):       │
//! │      skip active, out of range, or outside the frustum         │
//! │      materialize (recyclable first, else allocate)             │
//! │ 4. sample + extract every materialized chunk in parallel       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bookkeeping runs on the calling thread and completes before `update`
//! returns, so ticks never overlap. Extraction fans out over rayon inside
//! the tick.

use glam::{IVec3, Vec3};
use web_time::Instant;

use super::bounds::Aabb;
use super::frustum::Frustum;
use super::layout::{ChunkCoord, ChunkLayout, StreamingMode};
use super::store::{ChunkStore, Materialized};
use crate::density::{DensityField, DensityFunction, DensitySampler};
use crate::error::{SettingsError, StreamError};
use crate::extraction_stage::ExtractionStage;
use crate::metrics::StreamingMetrics;
use crate::settings::{BufferLifetime, GeneratorSettings, UpdateContext};
use crate::types::MeshOutput;

/// What one streaming pass did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
  /// Extraction jobs dispatched.
  pub extracted: usize,
  /// Jobs that failed; their chunks keep the previous mesh.
  pub failed: usize,
  /// Active chunks moved to the recycle queue.
  pub retired: usize,
  /// Chunks materialized from the recycle queue.
  pub reused: usize,
  /// Chunks materialized by allocation.
  pub allocated: usize,
  pub destroyed: usize,
  /// Candidates in range but outside the frustum.
  pub culled: usize,
  /// Duplicate edge ids dropped during assembly.
  pub duplicates: usize,
  /// Set when streaming was skipped because of a store error.
  pub suppressed: Option<StreamError>,
}

impl TickReport {
  /// True if the pass changed nothing.
  pub fn is_idle(&self) -> bool {
    self.extracted == 0
      && self.retired == 0
      && self.reused == 0
      && self.allocated == 0
      && self.destroyed == 0
  }
}

/// Owns the chunk store and drives extraction for a density sampler.
pub struct ChunkStreamer<F> {
  settings: GeneratorSettings,
  sampler: DensitySampler<F>,
  store: ChunkStore,
  stage: ExtractionStage,
  viewer: Option<Vec3>,
  frustum: Option<Frustum>,
  /// Settings changed since the last update.
  settings_dirty: bool,
  /// Active chunks must be re-extracted on the next run.
  invalidated: bool,
  reported_error: Option<StreamError>,
  metrics: StreamingMetrics,
}

impl ChunkStreamer<DensityFunction> {
  /// Build a streamer whose sampler comes from `settings.density`.
  pub fn from_settings(settings: GeneratorSettings) -> Result<Self, SettingsError> {
    let sampler = settings.density.build_sampler()?;
    Self::new(settings, sampler)
  }

  /// Apply new settings and rebuild the sampler from their density section.
  pub fn reload(&mut self, settings: GeneratorSettings) -> Result<(), SettingsError> {
    let sampler = settings.density.build_sampler()?;
    self.apply_settings(settings)?;
    self.set_sampler(sampler);
    Ok(())
  }
}

impl<F: DensityField> ChunkStreamer<F> {
  pub fn new(settings: GeneratorSettings, sampler: DensitySampler<F>) -> Result<Self, SettingsError> {
    settings.validate()?;
    Ok(Self {
      stage: ExtractionStage::new(settings.points_per_axis),
      settings,
      sampler,
      store: ChunkStore::new(),
      viewer: None,
      frustum: None,
      settings_dirty: true,
      invalidated: false,
      reported_error: None,
      metrics: StreamingMetrics::new(),
    })
  }

  pub fn settings(&self) -> &GeneratorSettings {
    &self.settings
  }

  pub fn store(&self) -> &ChunkStore {
    &self.store
  }

  pub fn metrics(&self) -> &StreamingMetrics {
    &self.metrics
  }

  pub fn viewer(&self) -> Option<Vec3> {
    self.viewer
  }

  pub fn set_viewer(&mut self, position: Option<Vec3>) {
    self.viewer = position;
  }

  /// Camera frustum used to cull new chunks. Ignored unless
  /// `frustum_culling` is enabled.
  pub fn set_frustum(&mut self, frustum: Option<Frustum>) {
    self.frustum = frustum;
  }

  /// Error currently suppressing streaming, if any.
  pub fn reported_error(&self) -> Option<&StreamError> {
    self.reported_error.as_ref()
  }

  /// Replace settings. Every active chunk is re-extracted on the next run.
  pub fn apply_settings(&mut self, settings: GeneratorSettings) -> Result<(), SettingsError> {
    settings.validate()?;
    self.stage.set_resolution(settings.points_per_axis);
    self.settings = settings;
    self.settings_dirty = true;
    self.invalidated = true;
    Ok(())
  }

  /// Replace the density sampler. Every active chunk is re-extracted on the
  /// next run.
  pub fn set_sampler(&mut self, sampler: DensitySampler<F>) {
    self.sampler = sampler;
    self.settings_dirty = true;
    self.invalidated = true;
  }

  /// Per-tick entry point.
  ///
  /// Follow mode streams every simulation tick. Otherwise a run happens only
  /// when settings changed and the auto-update flag for `context` allows it.
  pub fn update(&mut self, context: UpdateContext) -> TickReport {
    let dirty = std::mem::take(&mut self.settings_dirty);
    let follow_tick = !self.settings.fixed_map_size && context == UpdateContext::Simulation;
    if follow_tick || (dirty && self.settings.allows_update(context)) {
      self.run()
    } else {
      TickReport::default()
    }
  }

  /// Run a full update if the auto-update flag for `context` is set.
  pub fn request_mesh_update(&mut self, context: UpdateContext) -> Option<TickReport> {
    if self.settings.allows_update(context) {
      Some(self.run())
    } else {
      None
    }
  }

  /// One full streaming pass in the configured mode.
  #[cfg_attr(feature = "profiling", tracing::instrument(skip_all, name = "streamer::run"))]
  pub fn run(&mut self) -> TickReport {
    let start = Instant::now();
    let mut report = TickReport::default();

    match self.settings.streaming_mode() {
      StreamingMode::Fixed { num_chunks } => {
        self.resolve_error();
        self.init_fixed_chunks(num_chunks, &mut report);
      }
      StreamingMode::Follow { view_distance } => match self.viewer {
        Some(viewer) => {
          self.resolve_error();
          self.stream_visible(viewer, view_distance, &mut report);
        }
        None => {
          self.report_error(StreamError::ViewerUnset);
          report.suppressed = Some(StreamError::ViewerUnset);
        }
      },
    }

    self.dispatch(&mut report);
    if self.settings.buffer_lifetime == BufferLifetime::ReleaseAfterDispatch {
      self.stage.release_buffers();
    }

    let timing_us = start.elapsed().as_micros() as u64;
    self.metrics.record_tick(
      &report,
      timing_us,
      self.store.active_len(),
      self.store.recyclable_len(),
      self.store.allocated_len(),
    );
    if !report.is_idle() {
      tracing::debug!(
        extracted = report.extracted,
        retired = report.retired,
        reused = report.reused,
        allocated = report.allocated,
        destroyed = report.destroyed,
        culled = report.culled,
        active = self.store.active_len(),
        us = timing_us,
        "streaming tick"
      );
    }
    report
  }

  /// Bounds of every active chunk, for inspection overlays.
  pub fn chunk_bounds(&self) -> Vec<(ChunkCoord, Aabb)> {
    let layout = self.settings.layout();
    self
      .store
      .active_chunks()
      .map(|chunk| (chunk.coord, layout.bounds(chunk.coord)))
      .collect()
  }

  pub fn mesh(&self, coord: ChunkCoord) -> Option<&MeshOutput> {
    let slot = self.store.lookup(coord)?;
    self.store.get(slot).map(|chunk| &chunk.mesh)
  }

  /// Meshes of all active chunks.
  pub fn meshes(&self) -> impl Iterator<Item = (ChunkCoord, &MeshOutput)> + '_ {
    self
      .store
      .active_chunks()
      .map(|chunk| (chunk.coord, &chunk.mesh))
  }

  /// Release every chunk and all extraction buffers. Returns the number of
  /// chunks released. The streamer can be run again afterwards.
  pub fn teardown(&mut self) -> usize {
    self.stage.drain_completions();
    self.stage.release_buffers();
    let released = self.store.clear();
    self.settings_dirty = true;
    self.invalidated = false;
    tracing::debug!(released, "chunk streamer torn down");
    released
  }

  /// Fixed map: keep chunks inside `[0, num_chunks)`, destroy the rest, and
  /// extract every chunk of the map.
  fn init_fixed_chunks(&mut self, num_chunks: IVec3, report: &mut TickReport) {
    report.destroyed += self
      .store
      .destroy_where(|chunk| !ChunkLayout::in_fixed_map(chunk.coord, num_chunks));
    report.destroyed += self.store.destroy_recyclable();

    let layout = self.settings.layout();
    for coord in ChunkLayout::fixed_coords(num_chunks) {
      self.materialize_and_enqueue(&layout, coord, report);
    }
    self.invalidated = false;
  }

  fn stream_visible(&mut self, viewer: Vec3, view_distance: f32, report: &mut TickReport) {
    let layout = self.settings.layout();
    let max_sq = view_distance * view_distance;

    report.retired += self
      .store
      .retire_where(|chunk| layout.bounds(chunk.coord).distance_squared_to(viewer) > max_sq);

    if std::mem::take(&mut self.invalidated) {
      for chunk in self.store.active_chunks() {
        if let Some(slot) = self.store.lookup(chunk.coord) {
          self
            .stage
            .enqueue(slot, chunk.coord, layout.centre(chunk.coord));
        }
      }
    }

    let frustum = self.frustum.filter(|_| self.settings.frustum_culling);
    let centre = layout.viewer_coord(viewer);
    let radius = layout.scan_radius(view_distance);

    for z in -radius..=radius {
      for y in -radius..=radius {
        for x in -radius..=radius {
          let coord = centre + IVec3::new(x, y, z);
          if self.store.is_active(coord) {
            continue;
          }
          let bounds = layout.bounds(coord);
          if bounds.distance_squared_to(viewer) > max_sq {
            continue;
          }
          if frustum.is_some_and(|f| !f.intersects_aabb(&bounds)) {
            report.culled += 1;
            continue;
          }
          self.materialize_and_enqueue(&layout, coord, report);
        }
      }
    }
  }

  fn materialize_and_enqueue(
    &mut self,
    layout: &ChunkLayout,
    coord: ChunkCoord,
    report: &mut TickReport,
  ) {
    match self.store.materialize(coord, self.settings.points_per_axis) {
      Ok(outcome) => {
        match outcome {
          Materialized::Reused(_) => report.reused += 1,
          Materialized::Allocated(_) => report.allocated += 1,
          Materialized::AlreadyActive(_) => {}
        }
        self.stage.enqueue(outcome.slot(), coord, layout.centre(coord));
      }
      Err(err) => {
        tracing::warn!(coord = %coord, error = %err, "failed to materialize chunk");
        report.failed += 1;
      }
    }
  }

  fn dispatch(&mut self, report: &mut TickReport) {
    let params = self.settings.sample_params();
    report.extracted += self.stage.tick(&self.sampler, &params, &mut self.store);

    for completion in self.stage.drain_completions() {
      self.metrics.record_completion(&completion);
      match &completion.outcome {
        Ok(summary) => {
          self.store.mark_built(completion.slot);
          report.duplicates += summary.duplicates;
        }
        Err(err) => {
          tracing::warn!(coord = %completion.coord, error = %err, "chunk extraction failed");
          report.failed += 1;
        }
      }
    }
  }

  fn report_error(&mut self, err: StreamError) {
    if self.reported_error.as_ref() != Some(&err) {
      tracing::warn!(error = %err, "chunk streaming suppressed");
      self.reported_error = Some(err);
    }
  }

  fn resolve_error(&mut self) {
    if let Some(err) = self.reported_error.take() {
      tracing::debug!(error = %err, "chunk streaming resumed");
    }
  }
}

#[cfg(test)]
#[path = "streamer_test.rs"]
mod streamer_test;
