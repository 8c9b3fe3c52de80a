//! wgpu implementation of [`GpuBackend`].
//!
//! Draw calls are not encoded immediately: each `draw_triangles` appends
//! its vertices to one frame buffer and records `(texture, range)`. A
//! `render_to_*` call uploads the whole buffer once and replays the
//! draws in submission order inside a single render pass.

use std::collections::HashMap;
use std::ops::Range;

use wgpu::{
    BindGroup, Color, CommandEncoderDescriptor, ErrorFilter, Extent3d, LoadOp,
    Operations, Origin3d, RenderPassColorAttachment, RenderPassDescriptor,
    StoreOp, TextureAspect, TextureDescriptor, TextureDimension, TextureFormat,
    TextureUsages, TextureViewDescriptor,
};

use crate::batch::FrameStats;
use crate::context::GpuContext;
use crate::error::RenderError;
use crate::gpu::{check_region, GpuBackend, Viewport};
use crate::pipelines::quad::QuadPipeline;
use crate::texture::{expand_coverage, PixelFormat, Texture, TextureHandle};
use crate::vertex::Vertex;

struct GpuTexture {
    info: Texture,
    texture: wgpu::Texture,
    bind_group: BindGroup,
}

/// Renders batches through wgpu onto a window surface or an off-screen
/// target.
pub struct WgpuBackend {
    gpu: GpuContext,
    pipeline: QuadPipeline,
    textures: HashMap<TextureHandle, GpuTexture>,
    /// Destroyed while still referenced by the pending frame; released
    /// after the next render.
    retired: HashMap<TextureHandle, GpuTexture>,
    next_handle: u64,
    frame_vertices: Vec<Vertex>,
    frame_draws: Vec<(TextureHandle, Range<u32>)>,
    clear_color: Color,
    offscreen_size: (u32, u32),
}

impl WgpuBackend {
    pub fn new(gpu: GpuContext) -> Self {
        let pipeline = QuadPipeline::new(&gpu.device, gpu.target_format);
        Self {
            gpu,
            pipeline,
            textures: HashMap::new(),
            retired: HashMap::new(),
            next_handle: 1,
            frame_vertices: Vec::new(),
            frame_draws: Vec::new(),
            clear_color: Color::BLACK,
            offscreen_size: (0, 0),
        }
    }

    pub fn context(&self) -> &GpuContext {
        &self.gpu
    }

    /// Resize the surface, or the reported viewport when headless.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.gpu.has_surface() {
            self.gpu.resize(width, height);
        } else {
            self.offscreen_size = (width, height);
        }
    }

    /// Draws recorded since the last render.
    pub fn pending_draws(&self) -> usize {
        self.frame_draws.len()
    }

    /// Render pending draws to the window surface and present.
    pub fn render_to_surface(&mut self) -> Result<FrameStats, RenderError> {
        let surface = self.gpu.surface().ok_or(RenderError::NoSurface)?;
        let output = surface.get_current_texture()?;
        let view = output.texture.create_view(&TextureViewDescriptor::default());

        let stats = self.encode_frame(&view, "cubebox_frame");
        output.present();
        Ok(stats)
    }

    /// Render pending draws to an off-screen texture view.
    ///
    /// The view's format must match the context's `target_format`.
    pub fn render_to_texture(&mut self, target_view: &wgpu::TextureView) -> FrameStats {
        self.encode_frame(target_view, "cubebox_offscreen")
    }

    fn encode_frame(&mut self, view: &wgpu::TextureView, label: &str) -> FrameStats {
        self.pipeline
            .upload_vertices(&self.gpu.device, &self.gpu.queue, &self.frame_vertices);

        let mut encoder = self.gpu.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some(label),
        });

        let mut draw_calls = 0;
        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (handle, range) in &self.frame_draws {
                let entry = self.textures.get(handle).or_else(|| self.retired.get(handle));
                let Some(entry) = entry else {
                    log::warn!("skipping draw for vanished texture {:?}", handle);
                    continue;
                };
                self.pipeline.draw(&mut pass, &entry.bind_group, range.clone());
                draw_calls += 1;
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));

        let stats = FrameStats {
            quads: (self.frame_vertices.len() / 6) as u32,
            draw_calls,
        };
        self.frame_vertices.clear();
        self.frame_draws.clear();
        for (_, retired) in self.retired.drain() {
            retired.texture.destroy();
        }
        stats
    }

    fn write_pixels(
        &self,
        texture: &wgpu::Texture,
        format: PixelFormat,
        origin: Origin3d,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) {
        let rgba;
        let data = match format {
            PixelFormat::Rgba8 => pixels,
            PixelFormat::Coverage => {
                rgba = expand_coverage(pixels);
                rgba.as_slice()
            }
        };
        self.gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin,
                aspect: TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }
}

impl GpuBackend for WgpuBackend {
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
        let limit = self.gpu.max_texture_size();
        if width > limit || height > limit {
            return Err(RenderError::TextureTooLarge { width, height, limit });
        }
        if let Some(data) = pixels {
            let expected = format.byte_len(width, height);
            if data.len() != expected {
                return Err(RenderError::PixelDataLength {
                    expected,
                    got: data.len(),
                });
            }
        }

        self.gpu.device.push_error_scope(ErrorFilter::OutOfMemory);
        let texture = self.gpu.device.create_texture(&TextureDescriptor {
            label: Some("cubebox_texture"),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });
        if let Some(err) = pollster::block_on(self.gpu.device.pop_error_scope()) {
            return Err(RenderError::OutOfMemory(err.to_string()));
        }

        if let Some(data) = pixels {
            self.write_pixels(&texture, format, Origin3d::ZERO, width, height, data);
        }

        let view = texture.create_view(&TextureViewDescriptor::default());
        let bind_group = self.pipeline.create_bind_group(&self.gpu.device, &view);

        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;
        let info = Texture {
            handle,
            width,
            height,
            format,
        };
        self.textures.insert(
            handle,
            GpuTexture {
                info,
                texture,
                bind_group,
            },
        );
        log::debug!("created texture {:?} {}×{} {:?}", handle, width, height, format);
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
        let entry = self
            .textures
            .get(&texture)
            .ok_or(RenderError::UnknownTexture(texture))?;
        check_region(&entry.info, x, y, width, height, pixels)?;
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.write_pixels(
            &entry.texture,
            entry.info.format,
            Origin3d { x, y, z: 0 },
            width,
            height,
            pixels,
        );
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureHandle) -> Result<(), RenderError> {
        let entry = self
            .textures
            .remove(&texture)
            .ok_or(RenderError::UnknownTexture(texture))?;
        if self.frame_draws.iter().any(|(h, _)| *h == texture) {
            self.retired.insert(texture, entry);
        } else {
            entry.texture.destroy();
        }
        Ok(())
    }

    fn draw_triangles(&mut self, texture: TextureHandle, vertices: &[Vertex]) -> Result<(), RenderError> {
        if !self.textures.contains_key(&texture) {
            return Err(RenderError::UnknownTexture(texture));
        }
        if vertices.is_empty() {
            return Ok(());
        }
        let start = self.frame_vertices.len() as u32;
        self.frame_vertices.extend_from_slice(vertices);
        let end = self.frame_vertices.len() as u32;
        self.frame_draws.push((texture, start..end));
        Ok(())
    }

    fn set_clear_color(&mut self, [r, g, b, a]: [f64; 4]) {
        self.clear_color = Color { r, g, b, a };
    }
}

impl Viewport for WgpuBackend {
    fn viewport_size(&self) -> (u32, u32) {
        if self.gpu.has_surface() {
            self.gpu.surface_size()
        } else {
            self.offscreen_size
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::QuadBatch;
    use crate::vertex::{Quad, UvRect, WHITE};

    fn offscreen_target(backend: &WgpuBackend, width: u32, height: u32) -> wgpu::Texture {
        backend.context().device.create_texture(&TextureDescriptor {
            label: Some("test_target"),
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: backend.context().target_format,
            usage: TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    #[test]
    fn test_headless_viewport_follows_resize() {
        // May fail in CI without a GPU; skip gracefully.
        if let Ok(gpu) = pollster::block_on(GpuContext::new_headless(256)) {
            let mut backend = WgpuBackend::new(gpu);
            assert_eq!(backend.viewport_size(), (0, 0));
            backend.resize(320, 240);
            assert_eq!(backend.viewport_size(), (320, 240));
        }
    }

    #[test]
    fn test_texture_lifecycle() {
        if let Ok(gpu) = pollster::block_on(GpuContext::new_headless(256)) {
            let mut backend = WgpuBackend::new(gpu);
            let tex = backend
                .create_texture(4, 4, PixelFormat::Coverage, Some(&[255; 16]))
                .unwrap();
            backend.upload_region(tex.handle, 1, 1, 2, 2, &[0; 4]).unwrap();
            assert!(backend.upload_region(tex.handle, 3, 3, 2, 2, &[0; 4]).is_err());
            backend.destroy_texture(tex.handle).unwrap();
            assert!(matches!(
                backend.destroy_texture(tex.handle),
                Err(RenderError::UnknownTexture(_))
            ));
        }
    }

    #[test]
    fn test_oversized_texture_rejected() {
        if let Ok(gpu) = pollster::block_on(GpuContext::new_headless(256)) {
            let mut backend = WgpuBackend::new(gpu);
            let limit = backend.context().max_texture_size();
            let err = backend
                .create_texture(limit + 1, 1, PixelFormat::Rgba8, None)
                .unwrap_err();
            assert!(matches!(err, RenderError::TextureTooLarge { .. }));
        }
    }

    #[test]
    fn test_render_replays_draws_in_order() {
        if let Ok(gpu) = pollster::block_on(GpuContext::new_headless(256)) {
            let mut backend = WgpuBackend::new(gpu);
            backend.resize(64, 64);
            let a = backend.create_texture(1, 1, PixelFormat::Rgba8, Some(&[255; 4])).unwrap();
            let b = backend.create_texture(1, 1, PixelFormat::Rgba8, Some(&[128; 4])).unwrap();

            let quad = Quad::axis_aligned(0.0, 0.0, 8.0, 8.0, UvRect::FULL, WHITE);
            let mut batch = QuadBatch::new();
            batch.start(backend.viewport_size()).unwrap();
            batch.submit(&mut backend, a.handle, &quad).unwrap();
            batch.submit(&mut backend, b.handle, &quad).unwrap();
            batch.submit(&mut backend, a.handle, &quad).unwrap();
            batch.stop(&mut backend).unwrap();
            assert_eq!(backend.pending_draws(), 3);

            // Destroying a texture the frame still uses defers the release.
            backend.destroy_texture(b.handle).unwrap();

            let target = offscreen_target(&backend, 64, 64);
            let view = target.create_view(&TextureViewDescriptor::default());
            let stats = backend.render_to_texture(&view);
            assert_eq!(stats, FrameStats { quads: 3, draw_calls: 3 });
            assert_eq!(backend.pending_draws(), 0);
        }
    }

    #[test]
    fn test_render_to_surface_without_surface() {
        if let Ok(gpu) = pollster::block_on(GpuContext::new_headless(256)) {
            let mut backend = WgpuBackend::new(gpu);
            assert!(matches!(backend.render_to_surface(), Err(RenderError::NoSurface)));
        }
    }
}
