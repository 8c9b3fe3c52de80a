//! Error types shared by the batch renderer and its GPU backends.

use thiserror::Error;

use crate::texture::TextureHandle;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render pass already active")]
    PassActive,
    #[error("no render pass active")]
    PassInactive,
    #[error("unknown or destroyed texture {0:?}")]
    UnknownTexture(TextureHandle),
    #[error("texture size {width}×{height} is empty")]
    EmptyTexture { width: u32, height: u32 },
    #[error("texture {width}×{height} exceeds the device limit of {limit}")]
    TextureTooLarge { width: u32, height: u32, limit: u32 },
    #[error("GPU out of memory: {0}")]
    OutOfMemory(String),
    #[error("region {x},{y} {width}×{height} is outside texture {handle:?}")]
    RegionOutOfBounds {
        handle: TextureHandle,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("pixel data has {got} bytes, expected {expected}")]
    PixelDataLength { expected: usize, got: usize },
    #[error("tile data has {got} entries, layer needs {expected}")]
    TileCount { expected: usize, got: usize },
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("No surface configured (headless mode)")]
    NoSurface,
}
