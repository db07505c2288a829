//! Chunk storage: a slot arena with an active index and a recycle queue.
//!
//! ```text
//! slots:      [ A(0,0,0) | R(5,0,0) | -- | A(1,0,0) | R(6,0,0) ]
//!                  │          │       │       │           │
//! index:     (0,0,0)→0        │       │   (1,0,0)→3       │
//! active:    [0, 3]           │       │                   │
//! recyclable:[1, 4] ◄─────────┴───────┼───────────────────┘
//! vacant:    [2]    ◄─────────────────┘
//! ```
//!
//! `active_pos` maps each active slot to its position in `active`, so
//! retiring or destroying one is a `swap_remove`.
//!
//! Every slot is in exactly one of: active (listed in `active` and `index`),
//! recyclable, or vacant (destroyed, index reusable). Materializing a chunk
//! reuses a recyclable slot first, then a vacant slot, and only then grows
//! the arena.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use super::layout::ChunkCoord;
use crate::error::GridError;
use crate::types::{DensityGrid, MeshOutput};

/// Index of a chunk slot in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u32);

impl SlotId {
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Lifecycle of a chunk slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
  /// Allocated or reassigned, mesh not yet built at this coordinate.
  Uninitialized,
  Active,
  /// Out of range, waiting to be reused at a new coordinate.
  Recyclable,
}

#[derive(Clone, Debug)]
pub struct Chunk {
  pub coord: ChunkCoord,
  pub state: ChunkState,
  pub grid: DensityGrid,
  pub mesh: MeshOutput,
  /// Number of committed extractions for this slot.
  pub generation: u64,
}

impl Chunk {
  fn new(coord: ChunkCoord, points_per_axis: usize) -> Result<Self, GridError> {
    Ok(Self {
      coord,
      state: ChunkState::Uninitialized,
      grid: DensityGrid::new(points_per_axis)?,
      mesh: MeshOutput::new(),
      generation: 0,
    })
  }
}

/// How [`ChunkStore::materialize`] obtained its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Materialized {
  AlreadyActive(SlotId),
  Reused(SlotId),
  Allocated(SlotId),
}

impl Materialized {
  pub fn slot(self) -> SlotId {
    match self {
      Materialized::AlreadyActive(slot)
      | Materialized::Reused(slot)
      | Materialized::Allocated(slot) => slot,
    }
  }
}

#[derive(Debug, Default)]
pub struct ChunkStore {
  slots: Vec<Option<Chunk>>,
  active: Vec<SlotId>,
  /// Position in `active` per slot index, `None` when not active.
  active_pos: Vec<Option<usize>>,
  index: FxHashMap<ChunkCoord, SlotId>,
  recyclable: VecDeque<SlotId>,
  vacant: Vec<SlotId>,
}

impl ChunkStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn active_len(&self) -> usize {
    self.active.len()
  }

  pub fn recyclable_len(&self) -> usize {
    self.recyclable.len()
  }

  /// Slots currently holding a chunk (active or recyclable).
  pub fn allocated_len(&self) -> usize {
    self.slots.len() - self.vacant.len()
  }

  pub fn get(&self, slot: SlotId) -> Option<&Chunk> {
    self.slots.get(slot.index()).and_then(Option::as_ref)
  }

  pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut Chunk> {
    self.slots.get_mut(slot.index()).and_then(Option::as_mut)
  }

  pub fn lookup(&self, coord: ChunkCoord) -> Option<SlotId> {
    self.index.get(&coord).copied()
  }

  pub fn is_active(&self, coord: ChunkCoord) -> bool {
    self.index.contains_key(&coord)
  }

  pub fn active_slots(&self) -> &[SlotId] {
    &self.active
  }

  pub fn active_chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
    self.active.iter().filter_map(|&slot| self.get(slot))
  }

  /// Mutable access to the chunks in `slots`, in arena order. Unknown or
  /// vacant slots are skipped.
  pub fn chunks_mut<'a>(&'a mut self, slots: &[SlotId]) -> Vec<(SlotId, &'a mut Chunk)> {
    let mut wanted: Vec<usize> = slots.iter().map(|s| s.index()).collect();
    wanted.sort_unstable();
    wanted.dedup();
    self
      .slots
      .iter_mut()
      .enumerate()
      .filter(|(i, _)| wanted.binary_search(i).is_ok())
      .filter_map(|(i, chunk)| chunk.as_mut().map(|c| (SlotId(i as u32), c)))
      .collect()
  }

  /// Ensure an active chunk exists at `coord`.
  ///
  /// Reuses a recyclable chunk if one is queued, otherwise allocates. A
  /// reused or new chunk is `Uninitialized` until its first extraction is
  /// committed with [`ChunkStore::mark_built`].
  pub fn materialize(
    &mut self,
    coord: ChunkCoord,
    points_per_axis: usize,
  ) -> Result<Materialized, GridError> {
    if let Some(slot) = self.lookup(coord) {
      return Ok(Materialized::AlreadyActive(slot));
    }

    let reused = match self.recyclable.pop_front() {
      Some(slot) => match self.slots.get_mut(slot.index()).and_then(Option::as_mut) {
        Some(chunk) => {
          if let Err(err) = chunk.grid.resize(points_per_axis) {
            self.recyclable.push_front(slot);
            return Err(err);
          }
          chunk.coord = coord;
          chunk.state = ChunkState::Uninitialized;
          chunk.mesh.clear();
          Some(slot)
        }
        None => None,
      },
      None => None,
    };

    let outcome = match reused {
      Some(slot) => Materialized::Reused(slot),
      None => {
        let chunk = Chunk::new(coord, points_per_axis)?;
        let slot = match self.vacant.pop() {
          Some(slot) => {
            self.slots[slot.index()] = Some(chunk);
            slot
          }
          None => {
            self.slots.push(Some(chunk));
            SlotId((self.slots.len() - 1) as u32)
          }
        };
        Materialized::Allocated(slot)
      }
    };

    let slot = outcome.slot();
    self.index.insert(coord, slot);
    self.push_active(slot);
    Ok(outcome)
  }

  fn push_active(&mut self, slot: SlotId) {
    let i = slot.index();
    if self.active_pos.len() <= i {
      self.active_pos.resize(i + 1, None);
    }
    self.active_pos[i] = Some(self.active.len());
    self.active.push(slot);
  }

  fn remove_active(&mut self, slot: SlotId) -> bool {
    let Some(pos) = self.active_pos.get_mut(slot.index()).and_then(Option::take) else {
      return false;
    };
    self.active.swap_remove(pos);
    if let Some(&moved) = self.active.get(pos) {
      self.active_pos[moved.index()] = Some(pos);
    }
    true
  }

  /// Record a committed extraction.
  pub fn mark_built(&mut self, slot: SlotId) {
    if let Some(chunk) = self.get_mut(slot) {
      if chunk.state == ChunkState::Uninitialized {
        chunk.state = ChunkState::Active;
      }
    }
  }

  /// Move an active chunk to the recycle queue. Returns false if the slot is
  /// not active.
  pub fn retire(&mut self, slot: SlotId) -> bool {
    if !self.remove_active(slot) {
      return false;
    }
    if let Some(chunk) = self.slots[slot.index()].as_mut() {
      self.index.remove(&chunk.coord);
      chunk.state = ChunkState::Recyclable;
    }
    self.recyclable.push_back(slot);
    true
  }

  /// Retire every active chunk matching `predicate`. Returns how many moved.
  pub fn retire_where(&mut self, mut predicate: impl FnMut(&Chunk) -> bool) -> usize {
    let doomed: Vec<SlotId> = self
      .active
      .iter()
      .copied()
      .filter(|&slot| self.get(slot).is_some_and(&mut predicate))
      .collect();
    for &slot in &doomed {
      self.retire(slot);
    }
    doomed.len()
  }

  /// Drop a chunk entirely, freeing its slot index for reuse.
  pub fn destroy(&mut self, slot: SlotId) -> bool {
    let Some(chunk) = self.slots.get_mut(slot.index()).and_then(Option::take) else {
      return false;
    };
    match chunk.state {
      ChunkState::Recyclable => self.recyclable.retain(|&s| s != slot),
      ChunkState::Active | ChunkState::Uninitialized => {
        self.remove_active(slot);
        self.index.remove(&chunk.coord);
      }
    }
    self.vacant.push(slot);
    true
  }

  /// Destroy active chunks matching `predicate`.
  pub fn destroy_where(&mut self, mut predicate: impl FnMut(&Chunk) -> bool) -> usize {
    let doomed: Vec<SlotId> = self
      .active
      .iter()
      .copied()
      .filter(|&slot| self.get(slot).is_some_and(&mut predicate))
      .collect();
    for &slot in &doomed {
      self.destroy(slot);
    }
    doomed.len()
  }

  /// Destroy all queued recyclable chunks.
  pub fn destroy_recyclable(&mut self) -> usize {
    let count = self.recyclable.len();
    for slot in self.recyclable.drain(..) {
      if let Some(cell) = self.slots.get_mut(slot.index()) {
        *cell = None;
        self.vacant.push(slot);
      }
    }
    count
  }

  /// Release every chunk. Returns how many were held.
  pub fn clear(&mut self) -> usize {
    let held = self.allocated_len();
    self.slots.clear();
    self.active.clear();
    self.active_pos.clear();
    self.index.clear();
    self.recyclable.clear();
    self.vacant.clear();
    held
  }

  /// Verify the bookkeeping invariants. Returns a description of the first
  /// violation found.
  pub fn check_consistency(&self) -> Result<(), String> {
    if self.active.len() != self.index.len() {
      return Err(format!(
        "{} active slots but {} indexed coordinates",
        self.active.len(),
        self.index.len()
      ));
    }

    let mut seen = vec![0u8; self.slots.len()];
    for &slot in self.active.iter().chain(&self.recyclable).chain(&self.vacant) {
      match seen.get_mut(slot.index()) {
        Some(count) => *count += 1,
        None => return Err(format!("slot {slot:?} out of range")),
      }
    }
    if let Some(i) = seen.iter().position(|&c| c != 1) {
      return Err(format!("slot {} tracked {} times", i, seen[i]));
    }

    for (pos, &slot) in self.active.iter().enumerate() {
      if self.active_pos.get(slot.index()).copied().flatten() != Some(pos) {
        return Err(format!("active slot {slot:?} not tracked at position {pos}"));
      }
    }
    let tracked = self.active_pos.iter().filter(|p| p.is_some()).count();
    if tracked != self.active.len() {
      return Err(format!(
        "{tracked} tracked positions for {} active slots",
        self.active.len()
      ));
    }

    for &slot in &self.active {
      let chunk = self
        .get(slot)
        .ok_or_else(|| format!("active slot {slot:?} is vacant"))?;
      if chunk.state == ChunkState::Recyclable {
        return Err(format!("active slot {slot:?} is marked recyclable"));
      }
      if self.index.get(&chunk.coord) != Some(&slot) {
        return Err(format!("coordinate {} not indexed to {slot:?}", chunk.coord));
      }
    }
    for &slot in &self.recyclable {
      match self.get(slot) {
        Some(chunk) if chunk.state == ChunkState::Recyclable => {}
        _ => return Err(format!("recyclable slot {slot:?} has wrong state")),
      }
    }
    for &slot in &self.vacant {
      if self.get(slot).is_some() {
        return Err(format!("vacant slot {slot:?} still holds a chunk"));
      }
    }
    Ok(())
  }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
