//! In-memory GPU backend.
//!
//! Keeps every texture as CPU pixels and records each draw call in
//! submission order. No device is required, so atlas packing, batching
//! and layout can be exercised anywhere.

use std::collections::HashMap;

use crate::error::RenderError;
use crate::gpu::{check_region, GpuBackend, Viewport};
use crate::texture::{PixelFormat, Texture, TextureHandle};
use crate::vertex::Vertex;

/// One recorded draw call.
#[derive(Clone, Debug)]
pub struct DrawCall {
    pub texture: TextureHandle,
    pub vertices: Vec<Vertex>,
}

struct HeadlessTexture {
    info: Texture,
    pixels: Vec<u8>,
}

/// A [`GpuBackend`] that never touches a GPU.
pub struct HeadlessBackend {
    width: u32,
    height: u32,
    next_handle: u64,
    textures: HashMap<TextureHandle, HeadlessTexture>,
    draws: Vec<DrawCall>,
    clear_color: [f64; 4],
    /// Largest texture side accepted; bigger requests fail as a device would.
    pub max_texture_size: u32,
}

impl HeadlessBackend {
    /// Create a backend reporting a `width × height` viewport.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            next_handle: 1,
            textures: HashMap::new(),
            draws: Vec::new(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            max_texture_size: 8192,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Draw calls recorded so far, oldest first.
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Remove and return the recorded draw calls.
    pub fn take_draw_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.draws)
    }

    /// Number of textures created and not yet destroyed.
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Source-format pixels of a live texture.
    pub fn texture_pixels(&self, handle: TextureHandle) -> Option<&[u8]> {
        self.textures.get(&handle).map(|t| t.pixels.as_slice())
    }

    pub fn clear_color(&self) -> [f64; 4] {
        self.clear_color
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<Texture> {
        self.textures.get(&handle).map(|t| t.info)
    }
}

impl GpuBackend for HeadlessBackend {
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: Option<&[u8]>,
    ) -> Result<Texture, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyTexture { width, height });
        }
        if width > self.max_texture_size || height > self.max_texture_size {
            return Err(RenderError::TextureTooLarge {
                width,
                height,
                limit: self.max_texture_size,
            });
        }
        let expected = format.byte_len(width, height);
        let pixels = match pixels {
            Some(data) if data.len() != expected => {
                return Err(RenderError::PixelDataLength {
                    expected,
                    got: data.len(),
                });
            }
            Some(data) => data.to_vec(),
            None => vec![0u8; expected],
        };

        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;
        let info = Texture {
            handle,
            width,
            height,
            format,
        };
        self.textures.insert(handle, HeadlessTexture { info, pixels });
        Ok(info)
    }

    fn upload_region(
        &mut self,
        texture: TextureHandle,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<(), RenderError> {
        let tex = self
            .textures
            .get_mut(&texture)
            .ok_or(RenderError::UnknownTexture(texture))?;
        check_region(&tex.info, x, y, width, height, pixels)?;

        let bpp = tex.info.format.bytes_per_pixel();
        let row_bytes = width as usize * bpp;
        let stride = tex.info.width as usize * bpp;
        for row in 0..height as usize {
            let dst = (y as usize + row) * stride + x as usize * bpp;
            let src = row * row_bytes;
            tex.pixels[dst..dst + row_bytes].copy_from_slice(&pixels[src..src + row_bytes]);
        }
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureHandle) -> Result<(), RenderError> {
        self.textures
            .remove(&texture)
            .map(|_| ())
            .ok_or(RenderError::UnknownTexture(texture))
    }

    fn draw_triangles(&mut self, texture: TextureHandle, vertices: &[Vertex]) -> Result<(), RenderError> {
        if !self.textures.contains_key(&texture) {
            return Err(RenderError::UnknownTexture(texture));
        }
        self.draws.push(DrawCall {
            texture,
            vertices: vertices.to_vec(),
        });
        Ok(())
    }

    fn set_clear_color(&mut self, color: [f64; 4]) {
        self.clear_color = color;
    }
}

impl Viewport for HeadlessBackend {
    fn viewport_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
