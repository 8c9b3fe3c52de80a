//! Errors raised by font loading, glyph caching and text layout.

use thiserror::Error;

use cubebox_render::RenderError;

use crate::atlas::PageId;
use crate::fonts::FontId;

#[derive(Error, Debug)]
pub enum TextError {
    #[error("glyph {width}×{height} does not fit an atlas page of {page_size}")]
    GlyphTooLarge {
        width: u32,
        height: u32,
        page_size: u32,
    },
    #[error("Failed to parse font: {0}")]
    InvalidFont(String),
    #[error("pixel size must be finite and positive, got {0}")]
    InvalidPixelSize(f32),
    #[error("atlas page size must be positive")]
    InvalidPageSize,
    #[error("unknown or destroyed font {0:?}")]
    UnknownFont(FontId),
    #[error("atlas has no page {0:?}")]
    UnknownPage(PageId),
    #[error(transparent)]
    Render(#[from] RenderError),
}
