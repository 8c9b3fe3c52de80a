//! Copyable texture handles and image decoding.
//!
//! A [`Texture`] is a plain value: copying it never duplicates the GPU
//! resource. Exactly one [`GpuBackend::destroy_texture`] call releases
//! the underlying image; backends never hand out the same handle twice,
//! so a second destroy through any copy is reported as
//! [`RenderError::UnknownTexture`].
//!
//! [`GpuBackend::destroy_texture`]: crate::gpu::GpuBackend::destroy_texture
//! [`RenderError::UnknownTexture`]: crate::error::RenderError::UnknownTexture

use crate::error::RenderError;
use crate::gpu::GpuBackend;

/// Opaque GPU texture id issued by a [`GpuBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

/// Pixel layout of a texture's source data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One byte per pixel of glyph coverage. Sampled as white with
    /// alpha = coverage, so text and sprites share one shader.
    Coverage,
    /// Four bytes per pixel, RGBA.
    Rgba8,
}

impl PixelFormat {
    /// Bytes per pixel in source data.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Coverage => 1,
            PixelFormat::Rgba8 => 4,
        }
    }

    /// Expected byte length of a `width × height` block in this format.
    pub fn byte_len(self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.bytes_per_pixel()
    }
}

/// Non-owning view of a GPU texture plus its pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Texture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

/// Decode an encoded image (PNG, JPEG, BMP, GIF, TGA) and upload it as
/// an RGBA texture.
pub fn load_texture<G: GpuBackend + ?Sized>(gpu: &mut G, encoded: &[u8]) -> Result<Texture, RenderError> {
    let decoded = image::load_from_memory(encoded)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    let texture = gpu.create_texture(width, height, PixelFormat::Rgba8, Some(decoded.as_raw().as_slice()))?;
    log::debug!("loaded texture {:?} ({}×{})", texture.handle, width, height);
    Ok(texture)
}

/// Convert coverage bytes to white RGBA with alpha = coverage.
pub fn expand_coverage(coverage: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(coverage.len() * 4);
    for &alpha in coverage {
        rgba.extend_from_slice(&[255, 255, 255, alpha]);
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessBackend;

    fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
        let img = image::RgbaImage::from_raw(width, height, rgba.to_vec()).unwrap();
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_format_byte_len() {
        assert_eq!(PixelFormat::Coverage.byte_len(4, 3), 12);
        assert_eq!(PixelFormat::Rgba8.byte_len(4, 3), 48);
    }

    #[test]
    fn test_expand_coverage() {
        let rgba = expand_coverage(&[0, 128]);
        assert_eq!(rgba, vec![255, 255, 255, 0, 255, 255, 255, 128]);
    }

    #[test]
    fn test_load_png_texture() {
        let mut gpu = HeadlessBackend::new(800, 600);
        let pixels = [255, 0, 0, 255, 0, 255, 0, 255];
        let png = encode_png(2, 1, &pixels);

        let texture = load_texture(&mut gpu, &png).unwrap();
        assert_eq!((texture.width, texture.height), (2, 1));
        assert_eq!(texture.format, PixelFormat::Rgba8);
        assert_eq!(gpu.texture_pixels(texture.handle).unwrap(), &pixels);
    }

    #[test]
    fn test_load_garbage_is_error() {
        let mut gpu = HeadlessBackend::new(800, 600);
        let err = load_texture(&mut gpu, b"definitely not an image").unwrap_err();
        assert!(matches!(err, RenderError::Image(_)));
        assert_eq!(gpu.live_textures(), 0);
    }

    #[test]
    fn test_copies_share_handle() {
        let mut gpu = HeadlessBackend::new(64, 64);
        let texture = gpu.create_texture(4, 4, PixelFormat::Rgba8, None).unwrap();
        let copy = texture;
        assert_eq!(copy.handle, texture.handle);

        gpu.destroy_texture(texture.handle).unwrap();
        let again = gpu.destroy_texture(copy.handle).unwrap_err();
        assert!(matches!(again, RenderError::UnknownTexture(_)));
    }
}
