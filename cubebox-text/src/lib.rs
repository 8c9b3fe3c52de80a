//! # cubebox-text
//!
//! Bitmap text for cubebox: UTF-8 decoding, glyph rasterization via
//! `fontdue`, skyline-packed atlas pages, and quad layout that feeds the
//! batch renderer in `cubebox-render`.
//!
//! ## Architecture
//!
//! ```text
//! bytes ──► utf8::decode ──► codepoints
//!                                │
//!                                ▼
//!                     GlyphCache.lookup_or_load ──miss──► OutlineRasterizer
//!                                │                            │
//!                                │                            ▼
//!                                │                 GlyphAtlas.allocate + upload
//!                                ▼
//!                     layout_text ──► PositionedGlyph quads ──► QuadBatch
//! ```
//!
//! - **`utf8`** — Incremental DFA decoder that skips malformed input.
//! - **`atlas`** — Append-only coverage pages with skyline packing.
//! - **`raster`** — Rasterizer trait and the fontdue implementation.
//! - **`cache`** — Codepoint → glyph record map, filled lazily.
//! - **`fonts`** — Font registry with stable, never-reused ids.
//! - **`engine`** — Layout, drawing and measurement.

pub mod atlas;
pub mod cache;
pub mod engine;
pub mod error;
pub mod fonts;
pub mod raster;
pub mod utf8;

// Re-exports for ergonomic use.
pub use atlas::{AtlasConfig, GlyphAtlas, PageId, Placement, Skyline};
pub use cache::{GlyphCache, GlyphRecord};
pub use engine::{draw_text, font_height, layout_text, text_width, PositionedGlyph, TextLayout};
pub use error::TextError;
pub use fonts::{Font, FontId, FontRegistry};
pub use raster::{FontdueRasterizer, LineMetrics, OutlineRasterizer, RasterizedGlyph};
pub use utf8::{decode, DecodeState, Step, Utf8Decoder};
