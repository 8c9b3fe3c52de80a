//! The GPU capability consumed by the batch renderer and glyph atlas.
//!
//! Two implementations ship with the crate:
//!
//! - [`WgpuBackend`](crate::backend::WgpuBackend) — real rendering via `wgpu`.
//! - [`HeadlessBackend`](crate::headless::HeadlessBackend) — CPU-side
//!   textures and a recorded draw log, for tools and tests.

use crate::error::RenderError;
use crate::texture::{PixelFormat, Texture, TextureHandle};
use crate::vertex::Vertex;

/// Texture creation, sub-image upload, and ordered triangle-list draws.
///
/// Draws must execute in the order they are issued.
pub trait GpuBackend {
    /// Create a `width × height` texture. `pixels`, when given, must hold
    /// exactly `format.byte_len(width, height)` bytes; otherwise the
    /// texture starts zeroed.
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: Option<&[u8]>,
    ) -> Result<Texture, RenderError>;

    /// Overwrite the sub-rectangle `(x, y, width, height)` of a texture.
    /// `pixels` are tightly packed rows in the texture's own format.
    fn upload_region(
        &mut self,
        texture: TextureHandle,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<(), RenderError>;

    /// Release a texture. Valid exactly once per handle.
    fn destroy_texture(&mut self, texture: TextureHandle) -> Result<(), RenderError>;

    /// Bind `texture` and draw `vertices` as a triangle list.
    fn draw_triangles(&mut self, texture: TextureHandle, vertices: &[Vertex]) -> Result<(), RenderError>;

    /// Background color for subsequent frames, RGBA in `[0, 1]`.
    /// Backends that never present ignore it.
    fn set_clear_color(&mut self, _color: [f64; 4]) {}
}

/// Current window (or render target) size in pixels.
pub trait Viewport {
    fn viewport_size(&self) -> (u32, u32);
}

/// Check an upload against a texture's bounds and pixel format.
///
/// Backends call this before touching memory; callers that mirror a
/// texture on the CPU call it before writing their copy.
pub fn check_region(
    texture: &Texture,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<(), RenderError> {
    let fits_x = x.checked_add(width).is_some_and(|r| r <= texture.width);
    let fits_y = y.checked_add(height).is_some_and(|b| b <= texture.height);
    if !fits_x || !fits_y {
        return Err(RenderError::RegionOutOfBounds {
            handle: texture.handle,
            x,
            y,
            width,
            height,
        });
    }
    let expected = texture.format.byte_len(width, height);
    if pixels.len() != expected {
        return Err(RenderError::PixelDataLength {
            expected,
            got: pixels.len(),
        });
    }
    Ok(())
}
