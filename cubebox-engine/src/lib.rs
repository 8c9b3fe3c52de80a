//! # cubebox-engine
//!
//! The caller-owned context tying the renderer and text stack together.
//! One [`Engine`] owns a GPU backend, the font registry and the quad
//! batch; every drawing call goes through it, so there is no global
//! renderer state.
//!
//! ```ignore
//! let mut engine = Engine::new(WgpuBackend::new(gpu), EngineConfig::default());
//! let font = engine.load_font(&font_bytes, 24.0)?;
//! let hero = engine.load_texture(&png_bytes)?;
//!
//! engine.begin()?;
//! engine.draw_image(&Image::new(hero).at(100.0, 80.0))?;
//! engine.draw_text(font, "Score: 42", 10.0, 30.0, WHITE)?;
//! let stats = engine.end()?;
//! engine.gpu_mut().render_to_surface()?;
//! ```

pub mod error;

use cubebox_render::{
    load_texture, FrameStats, GpuBackend, Image, PixelFormat, QuadBatch, Sprite, Texture,
    TileLayer, Viewport,
};
use cubebox_text::{font_height, text_width, AtlasConfig, FontId, FontRegistry, OutlineRasterizer};

pub use error::EngineError;

/// Engine-wide settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    /// Page size and padding for every font's glyph atlas.
    pub atlas: AtlasConfig,
    /// Background color, RGBA in `[0, 1]`.
    pub clear_color: [f64; 4],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            atlas: AtlasConfig::default(),
            clear_color: [0.12, 0.12, 0.13, 1.0],
        }
    }
}

/// Renderer, fonts and batch for one GPU backend.
pub struct Engine<G: GpuBackend + Viewport> {
    gpu: G,
    fonts: FontRegistry,
    batch: QuadBatch,
    config: EngineConfig,
}

impl<G: GpuBackend + Viewport> Engine<G> {
    pub fn new(mut gpu: G, config: EngineConfig) -> Self {
        gpu.set_clear_color(config.clear_color);
        log::info!(
            "engine ready: atlas pages {}px, padding {}",
            config.atlas.page_size,
            config.atlas.padding
        );
        Self {
            gpu,
            fonts: FontRegistry::new(config.atlas),
            batch: QuadBatch::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    pub fn batch(&self) -> &QuadBatch {
        &self.batch
    }

    // ── Textures ────────────────────────────────────────────────────

    /// Decode an encoded image (PNG, JPEG, …) into an RGBA texture.
    pub fn load_texture(&mut self, encoded: &[u8]) -> Result<Texture, EngineError> {
        Ok(load_texture(&mut self.gpu, encoded)?)
    }

    /// Create a texture from raw pixels in `format`.
    pub fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: &[u8],
    ) -> Result<Texture, EngineError> {
        Ok(self.gpu.create_texture(width, height, format, Some(pixels))?)
    }

    /// Release a texture. Any copy of the same handle is invalid afterwards.
    pub fn destroy_texture(&mut self, texture: Texture) -> Result<(), EngineError> {
        Ok(self.gpu.destroy_texture(texture.handle)?)
    }

    // ── Fonts ───────────────────────────────────────────────────────

    /// Parse a TrueType/OpenType font and register it at `pixel_size`.
    pub fn load_font(&mut self, data: &[u8], pixel_size: f32) -> Result<FontId, EngineError> {
        Ok(self.fonts.load_font(data, pixel_size)?)
    }

    /// Register a font backed by a custom rasterizer.
    pub fn load_font_with(
        &mut self,
        rasterizer: Box<dyn OutlineRasterizer>,
        pixel_size: f32,
    ) -> Result<FontId, EngineError> {
        Ok(self.fonts.load_with(rasterizer, pixel_size)?)
    }

    pub fn destroy_font(&mut self, font: FontId) -> Result<(), EngineError> {
        Ok(self.fonts.destroy_font(&mut self.gpu, font)?)
    }

    // ── Frame ───────────────────────────────────────────────────────

    /// Start a render pass sized to the backend's current viewport.
    pub fn begin(&mut self) -> Result<(), EngineError> {
        let viewport = self.gpu.viewport_size();
        Ok(self.batch.start(viewport)?)
    }

    pub fn draw_image(&mut self, image: &Image) -> Result<(), EngineError> {
        Ok(self.batch.draw_image(&mut self.gpu, image)?)
    }

    pub fn draw_sprite(&mut self, sprite: &Sprite) -> Result<(), EngineError> {
        Ok(self.batch.draw_sprite(&mut self.gpu, sprite)?)
    }

    pub fn draw_tiles(&mut self, layer: &TileLayer) -> Result<(), EngineError> {
        Ok(self.batch.draw_tiles(&mut self.gpu, layer)?)
    }

    /// Draw UTF-8 `text` with its baseline at `y`. Returns the cursor x
    /// after the last glyph.
    pub fn draw_text(
        &mut self,
        font: FontId,
        text: impl AsRef<[u8]>,
        x: f32,
        y: f32,
        color: [f32; 4],
    ) -> Result<f32, EngineError> {
        Ok(cubebox_text::draw_text(
            &mut self.fonts,
            &mut self.gpu,
            &mut self.batch,
            font,
            text.as_ref(),
            x,
            y,
            color,
        )?)
    }

    /// Flush the pass and return its statistics.
    pub fn end(&mut self) -> Result<FrameStats, EngineError> {
        Ok(self.batch.stop(&mut self.gpu)?)
    }

    // ── Measurement ─────────────────────────────────────────────────

    pub fn text_width(&mut self, font: FontId, text: impl AsRef<[u8]>) -> Result<f32, EngineError> {
        Ok(text_width(&mut self.fonts, &mut self.gpu, font, text.as_ref())?)
    }

    pub fn font_height(&self, font: FontId) -> Result<f32, EngineError> {
        Ok(font_height(&self.fonts, font)?)
    }

    /// Destroy every font and hand the backend back.
    pub fn shutdown(mut self) -> G {
        if self.batch.is_active() {
            log::warn!("shutting down with an open render pass; pending quads dropped");
        }
        if let Err(e) = self.fonts.clear(&mut self.gpu) {
            log::warn!("font teardown: {}", e);
        }
        log::info!("engine shut down");
        self.gpu
    }
}
