//! Chunk partitioning, lifecycle and streaming.
//!
//! ```text
//!                 materialize                 out of range
//! Uninitialized ──────────────► Active ─────────────────────► Recyclable
//!       ▲          (extract)                                      │
//!       └─────────────────── reused at a new coordinate ──────────┘
//!                                                                 │
//!                                            teardown / map shrink ▼
//!                                                             Destroyed
//! ```

mod bounds;
mod frustum;
mod layout;
mod store;
mod streamer;

pub use bounds::Aabb;
pub use frustum::{Frustum, Plane};
pub use layout::{ChunkCoord, ChunkLayout, StreamingMode};
pub use store::{Chunk, ChunkState, ChunkStore, Materialized, SlotId};
pub use streamer::{ChunkStreamer, TickReport};
