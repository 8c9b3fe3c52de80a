//! Quad batch renderer — accumulates textured quads and issues the
//! fewest draw calls that still preserve submission order.
//!
//! ## Protocol
//!
//! ```text
//!  Idle ──start(viewport)──► Active(current = none, buffer = [])
//!                              │  submit(texture, quad)   (any number)
//!  Idle ◄─────stop()───────────┘
//! ```
//!
//! A submit whose texture differs from the buffered one flushes first,
//! so draws are split exactly at texture transitions and never merged
//! across an interruption. Back-to-front blending stays correct at the
//! cost of one extra draw per transition.

use crate::error::RenderError;
use crate::gpu::GpuBackend;
use crate::sprite::{Image, Sprite};
use crate::texture::TextureHandle;
use crate::tiles::TileLayer;
use crate::transform::Mat4;
use crate::vertex::{Quad, Vertex};

/// Statistics for one render pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Number of quads submitted.
    pub quads: u32,
    /// Number of draw calls issued.
    pub draw_calls: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BatchState {
    Idle,
    Active,
}

/// Batches quads that share a texture into single draw calls.
pub struct QuadBatch {
    state: BatchState,
    vertices: Vec<Vertex>,
    current: Option<TextureHandle>,
    projection: Mat4,
    stats: FrameStats,
}

impl Default for QuadBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadBatch {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Preallocate room for `quads` quads.
    pub fn with_capacity(quads: usize) -> Self {
        Self {
            state: BatchState::Idle,
            vertices: Vec::with_capacity(quads * 6),
            current: None,
            projection: Mat4::IDENTITY,
            stats: FrameStats::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == BatchState::Active
    }

    /// Vertices waiting for the next flush.
    pub fn pending_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Texture of the buffered run, if any quad was submitted since the
    /// last texture change.
    pub fn current_texture(&self) -> Option<TextureHandle> {
        self.current
    }

    /// Projection of the active pass.
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Begin a render pass for a `width × height` pixel viewport.
    pub fn start(&mut self, viewport: (u32, u32)) -> Result<(), RenderError> {
        if self.state == BatchState::Active {
            return Err(RenderError::PassActive);
        }
        self.projection = Mat4::orthographic(viewport.0 as f32, viewport.1 as f32);
        self.vertices.clear();
        self.current = None;
        self.stats = FrameStats::default();
        self.state = BatchState::Active;
        Ok(())
    }

    /// Append one quad, flushing first if the texture changes.
    pub fn submit<G: GpuBackend + ?Sized>(
        &mut self,
        gpu: &mut G,
        texture: TextureHandle,
        quad: &Quad,
    ) -> Result<(), RenderError> {
        if self.state != BatchState::Active {
            return Err(RenderError::PassInactive);
        }
        if self.current != Some(texture) && !self.vertices.is_empty() {
            self.flush(gpu)?;
        }
        self.current = Some(texture);

        for &corner in &Quad::TRIANGLES {
            self.vertices.push(Vertex::new(
                self.projection.transform_point(quad.corners[corner]),
                quad.uv.corner(corner),
                quad.color,
            ));
        }
        self.stats.quads += 1;
        Ok(())
    }

    /// End the pass with a final flush.
    pub fn stop<G: GpuBackend + ?Sized>(&mut self, gpu: &mut G) -> Result<FrameStats, RenderError> {
        if self.state != BatchState::Active {
            return Err(RenderError::PassInactive);
        }
        // Leave the pass even if the last draw fails, so the next frame can start.
        self.state = BatchState::Idle;
        let flushed = self.flush(gpu);
        self.current = None;
        flushed?;
        log::trace!(
            "batch pass: {} quads in {} draw calls",
            self.stats.quads,
            self.stats.draw_calls
        );
        Ok(self.stats)
    }

    /// Draw an image through its position/rotation/scale transform.
    pub fn draw_image<G: GpuBackend + ?Sized>(&mut self, gpu: &mut G, image: &Image) -> Result<(), RenderError> {
        self.submit(gpu, image.texture.handle, &image.quad())
    }

    /// Draw the current frame of an animated sprite.
    pub fn draw_sprite<G: GpuBackend + ?Sized>(&mut self, gpu: &mut G, sprite: &Sprite) -> Result<(), RenderError> {
        self.draw_image(gpu, sprite.image())
    }

    /// Draw every non-empty cell of a tile layer.
    pub fn draw_tiles<G: GpuBackend + ?Sized>(&mut self, gpu: &mut G, layer: &TileLayer) -> Result<(), RenderError> {
        for image in layer.images() {
            self.draw_image(gpu, &image)?;
        }
        Ok(())
    }

    fn flush<G: GpuBackend + ?Sized>(&mut self, gpu: &mut G) -> Result<(), RenderError> {
        let Some(texture) = self.current else {
            return Ok(());
        };
        if self.vertices.is_empty() {
            return Ok(());
        }
        let result = gpu.draw_triangles(texture, &self.vertices);
        self.vertices.clear();
        result?;
        self.stats.draw_calls += 1;
        Ok(())
    }
}
