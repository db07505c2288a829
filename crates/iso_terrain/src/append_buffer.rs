//! Fixed-capacity append collection for concurrent producers.
//!
//! Producers reserve a slot with an atomic `fetch_add` on the counter and then
//! write into that slot exactly once. Slots are never shared, so no two tasks
//! overwrite each other, but the order of entries reflects scheduling and must
//! not be relied on.
//!
//! ```text
//!   task A ─┐ fetch_add → 0 ─► [A][ ][ ][ ]
//!   task B ─┤ fetch_add → 1 ─► [A][B][ ][ ]
//!   task C ─┘ fetch_add → 2 ─► [A][B][C][ ]
//!                                         ▲ capacity
//! ```
//!
//! Reservations past capacity fail with [`AppendOverflow`]. The counter keeps
//! counting so the caller can tell how far over the dispatch went.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// A push was attempted on a full buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppendOverflow {
  pub capacity: usize,
}

pub struct AppendBuffer<T> {
  slots: Box<[OnceLock<T>]>,
  count: AtomicUsize,
}

impl<T> AppendBuffer<T> {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      slots: (0..capacity).map(|_| OnceLock::new()).collect(),
      count: AtomicUsize::new(0),
    }
  }

  #[inline]
  pub fn capacity(&self) -> usize {
    self.slots.len()
  }

  /// Number of committed entries (clamped to capacity after an overflow).
  #[inline]
  pub fn len(&self) -> usize {
    self.count.load(Ordering::Acquire).min(self.slots.len())
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// True once any reservation has failed since the last reset.
  #[inline]
  pub fn overflowed(&self) -> bool {
    self.count.load(Ordering::Acquire) > self.slots.len()
  }

  /// Reserve a slot and write `value` into it. Returns the slot index.
  #[inline]
  pub fn push(&self, value: T) -> Result<usize, AppendOverflow> {
    let slot = self.count.fetch_add(1, Ordering::AcqRel);
    match self.slots.get(slot) {
      Some(cell) => {
        // Each index is handed out once per reset, so the cell is empty.
        let _ = cell.set(value);
        Ok(slot)
      }
      None => Err(AppendOverflow {
        capacity: self.slots.len(),
      }),
    }
  }

  /// Committed entries. Requires exclusive access, so every producer has
  /// finished.
  pub fn iter(&mut self) -> impl Iterator<Item = &T> {
    let len = self.len();
    self.slots[..len].iter().filter_map(OnceLock::get)
  }

  /// Move committed entries out and reset the counter, keeping the slots.
  pub fn drain(&mut self) -> Vec<T> {
    let len = self.len();
    let out = self.slots[..len]
      .iter_mut()
      .filter_map(OnceLock::take)
      .collect();
    self.count.store(0, Ordering::Release);
    out
  }

  /// Discard all entries.
  pub fn reset(&mut self) {
    let len = self.len();
    for cell in &mut self.slots[..len] {
      cell.take();
    }
    self.count.store(0, Ordering::Release);
  }
}

impl<T> std::fmt::Debug for AppendBuffer<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppendBuffer")
      .field("len", &self.len())
      .field("capacity", &self.capacity())
      .finish()
  }
}
