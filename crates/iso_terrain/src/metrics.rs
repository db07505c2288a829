//! Streaming and extraction statistics.
//!
//! Feature-gated and runtime-toggled to ensure zero overhead when disabled.
//!
//! # Usage
//!
//! ```ignore
//! use iso_terrain::metrics::COLLECT_METRICS;
//!
//! // Compile with --features metrics
//! // Runtime toggle:
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let metrics = streamer.metrics();
//! println!("avg extraction: {:.1}us", metrics.avg_mesh_timing_us());
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

use crate::chunk::TickReport;
use crate::extraction_stage::ExtractionCompletion;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
  #[cfg(feature = "metrics")]
  {
    COLLECT_METRICS.load(Ordering::Relaxed)
  }
  #[cfg(not(feature = "metrics"))]
  {
    false
  }
}

/// Rolling window for storing recent values (e.g., timing history).
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  buffer: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  pub fn new(capacity: usize) -> Self {
    Self {
      buffer: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  /// Push a new value, evicting the oldest if at capacity.
  pub fn push(&mut self, value: T) {
    if self.buffer.len() >= self.capacity {
      self.buffer.pop_front();
    }
    self.buffer.push_back(value);
  }

  pub fn len(&self) -> usize {
    self.buffer.len()
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn clear(&mut self) {
    self.buffer.clear();
  }

  /// Iterate over values (oldest to newest).
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.buffer.iter()
  }

  pub fn last(&self) -> Option<&T> {
    self.buffer.back()
  }
}

impl RollingWindow<u64> {
  pub fn sum(&self) -> u64 {
    self.buffer.iter().sum()
  }

  pub fn average(&self) -> f64 {
    if self.buffer.is_empty() {
      0.0
    } else {
      self.sum() as f64 / self.buffer.len() as f64
    }
  }

  pub fn min_max(&self) -> Option<(u64, u64)> {
    let min = self.buffer.iter().min()?;
    let max = self.buffer.iter().max()?;
    Some((*min, *max))
  }
}

impl Default for RollingWindow<u64> {
  fn default() -> Self {
    Self::new(128)
  }
}

/// Chunk streaming statistics, updated once per tick.
#[derive(Debug, Clone, Default)]
pub struct StreamingMetrics {
  // Store snapshot
  pub active_chunks: usize,
  pub recyclable_chunks: usize,
  pub allocated_slots: usize,

  // Cumulative counters
  pub total_extracted: u64,
  pub total_failed: u64,
  pub total_reused: u64,
  pub total_allocated: u64,
  pub total_retired: u64,
  pub total_culled: u64,
  /// Duplicate edge ids reported by assembly. Nonzero means a table bug.
  pub duplicate_edges: u64,

  // Timing
  /// Rolling window of per-chunk sampling times in microseconds.
  pub sample_timings: RollingWindow<u64>,
  /// Rolling window of per-chunk extraction times in microseconds.
  pub mesh_timings: RollingWindow<u64>,
  /// Rolling window of whole-tick times in microseconds.
  pub tick_timings: RollingWindow<u64>,
  pub last_tick_us: u64,
}

impl StreamingMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record one finished extraction job.
  pub fn record_completion(&mut self, completion: &ExtractionCompletion) {
    if !is_enabled() {
      return;
    }
    self.sample_timings.push(completion.sample_time_us);
    self.mesh_timings.push(completion.mesh_time_us);
    match &completion.outcome {
      Ok(summary) => self.duplicate_edges += summary.duplicates as u64,
      Err(_) => self.total_failed += 1,
    }
  }

  /// Record a streaming tick and the store sizes after it.
  pub fn record_tick(
    &mut self,
    report: &TickReport,
    timing_us: u64,
    active: usize,
    recyclable: usize,
    allocated: usize,
  ) {
    if !is_enabled() {
      return;
    }
    self.active_chunks = active;
    self.recyclable_chunks = recyclable;
    self.allocated_slots = allocated;
    self.total_extracted += report.extracted as u64;
    self.total_reused += report.reused as u64;
    self.total_allocated += report.allocated as u64;
    self.total_retired += report.retired as u64;
    self.total_culled += report.culled as u64;
    self.tick_timings.push(timing_us);
    self.last_tick_us = timing_us;
  }

  pub fn avg_mesh_timing_us(&self) -> f64 {
    self.mesh_timings.average()
  }

  pub fn avg_sample_timing_us(&self) -> f64 {
    self.sample_timings.average()
  }

  /// Reset timings and snapshot values. Cumulative counters are kept.
  pub fn reset(&mut self) {
    self.active_chunks = 0;
    self.recyclable_chunks = 0;
    self.allocated_slots = 0;
    self.sample_timings.clear();
    self.mesh_timings.clear();
    self.tick_timings.clear();
    self.last_tick_us = 0;
  }
}
