//! iso_terrain - Marching cubes isosurface extraction with chunk streaming
//!
//! This crate turns scalar density fields into triangle meshes and manages a
//! lattice of chunks around a moving viewer (or over a fixed map), extracting
//! each chunk's mesh in parallel.
//!
//! # Features
//!
//! - **Parallel marching cubes**: data-parallel edge and triangle passes into
//!   append buffers, merged into an indexed mesh with shared vertices
//! - **Chunk streaming**: view-distance and frustum driven chunk lifecycle
//!   with slot recycling
//! - **Density fields**: closures or configurable built-in shapes (sphere,
//!   plane, box, fractal noise)
//!
//! # Example
//!
//! ```ignore
//! use iso_terrain::{marching_cubes, DensityGrid, ExtractionBuffers};
//!
//! let grid = DensityGrid::from_densities(32, 1.0, &densities)?;
//! let mut buffers = ExtractionBuffers::new(32);
//! let mesh = marching_cubes::generate(&grid, 0.0, &mut buffers)?;
//!
//! println!("Generated {} vertices, {} triangles",
//!     mesh.vertices.len(), mesh.triangle_count());
//! ```

pub mod append_buffer;
pub mod constants;
pub mod edge_id;
pub mod edge_table;
pub mod error;
pub mod normals;
pub mod types;

// Re-export commonly used items
pub use constants::{coord_to_index, index_to_coord, CORNER_OFFSETS};
pub use edge_id::{Axis, EdgeId};
pub use edge_table::{EDGE_CORNERS, EDGE_TABLE, TRI_TABLE};
pub use error::{ExtractError, GridError, SettingsError, StreamError};
pub use types::{DensityGrid, GridSample, MeshOutput, MinMaxAABB};

// Marching cubes extraction
pub mod marching_cubes;
pub use marching_cubes::{Assembled, ExtractionBuffers};

// Density fields and sampling
pub mod density;
pub use density::{DensityField, DensityFunction, DensitySampler, DensityShape};

// Parallel sample + extract jobs
pub mod extraction_stage;
pub use extraction_stage::{ExtractionCompletion, ExtractionStage, SampleParams};

// Chunk lifecycle and streaming
pub mod chunk;
pub use chunk::{Aabb, ChunkCoord, ChunkStreamer, Frustum, TickReport};

pub mod settings;
pub use settings::{BufferLifetime, DensitySettings, GeneratorSettings, UpdateContext};

// Metrics collection (feature-gated)
pub mod metrics;
