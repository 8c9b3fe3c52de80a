//! # cubebox-render
//!
//! Batched 2D quad rendering for cubebox, built on `wgpu`.
//!
//! ## Architecture
//!
//! ```text
//!  Image / Sprite / TileLayer / glyph quads
//!       │
//!       ▼
//!  QuadBatch.submit()               ◀─── projects corners, splits on texture change
//!       │
//!       ▼
//!  GpuBackend.draw_triangles()      ◀─── one call per same-texture run
//!       │
//!       ├── WgpuBackend             ◀─── replays draws in a single render pass
//!       └── HeadlessBackend         ◀─── records draws in memory
//! ```
//!
//! ## Crate modules
//!
//! - [`gpu`] — the `GpuBackend` / `Viewport` capability traits
//! - [`texture`] — texture handles, pixel formats, image decoding
//! - [`vertex`] — vertex layout, UV rectangles, quads
//! - [`transform`] — 4×4 matrices and quad corner placement
//! - [`batch`] — the quad batch renderer
//! - [`sprite`] — images and animated sprite sheets
//! - [`tiles`] — tile-map layers
//! - [`context`] — host-supplied device, queue and optional surface
//! - [`pipelines`] — wgpu render pipelines
//! - [`backend`] — the wgpu `GpuBackend`
//! - [`headless`] — the in-memory `GpuBackend`

pub mod backend;
pub mod batch;
pub mod context;
pub mod error;
pub mod gpu;
pub mod headless;
pub mod pipelines;
pub mod sprite;
pub mod texture;
pub mod tiles;
pub mod transform;
pub mod vertex;

// Re-exports for convenience
pub use backend::WgpuBackend;
pub use batch::{FrameStats, QuadBatch};
pub use context::{GpuContext, GpuError, OFFSCREEN_FORMAT};
pub use error::RenderError;
pub use gpu::{check_region, GpuBackend, Viewport};
pub use headless::{DrawCall, HeadlessBackend};
pub use sprite::{Image, Sprite};
pub use texture::{load_texture, PixelFormat, Texture, TextureHandle};
pub use tiles::TileLayer;
pub use transform::Mat4;
pub use vertex::{Quad, UvRect, Vertex, WHITE};

// Hosts building surfaces or render targets need the same wgpu version.
pub use wgpu;
