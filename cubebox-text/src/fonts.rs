//! Font registry — loaded faces, each with its own atlas and glyph cache.
//!
//! ```text
//! FontRegistry
//!   └── slots: Vec<Option<Font>>          (indexed by FontId, never reused)
//!         ├── rasterizer: Box<dyn OutlineRasterizer>
//!         ├── atlas: GlyphAtlas           (pages append-only)
//!         └── cache: GlyphCache           (codepoint → GlyphRecord)
//! ```

use std::fmt;

use cubebox_render::GpuBackend;

use crate::atlas::{AtlasConfig, GlyphAtlas};
use crate::cache::{GlyphCache, GlyphRecord};
use crate::error::TextError;
use crate::raster::{FontdueRasterizer, LineMetrics, OutlineRasterizer};

/// Handle to a font in a [`FontRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub usize);

impl fmt::Display for FontId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font#{}", self.0)
    }
}

/// A face at one pixel size.
pub struct Font {
    rasterizer: Box<dyn OutlineRasterizer>,
    pixel_size: f32,
    line_metrics: LineMetrics,
    atlas: GlyphAtlas,
    cache: GlyphCache,
}

impl Font {
    pub fn pixel_size(&self) -> f32 {
        self.pixel_size
    }

    pub fn line_metrics(&self) -> LineMetrics {
        self.line_metrics
    }

    /// Pixel size plus the face's line gap.
    pub fn height(&self) -> f32 {
        self.pixel_size + self.line_metrics.line_gap
    }

    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    pub fn cache(&self) -> &GlyphCache {
        &self.cache
    }

    /// Cached record for `codepoint`, loading it on first use.
    pub fn glyph<G: GpuBackend + ?Sized>(
        &mut self,
        gpu: &mut G,
        codepoint: u32,
    ) -> Result<Option<GlyphRecord>, TextError> {
        self.cache.lookup_or_load(
            self.rasterizer.as_ref(),
            &mut self.atlas,
            gpu,
            self.pixel_size,
            codepoint,
        )
    }

    fn release<G: GpuBackend + ?Sized>(&mut self, gpu: &mut G) -> Result<(), TextError> {
        self.cache.clear();
        self.atlas.destroy(gpu)
    }
}

/// Owns every loaded font.
pub struct FontRegistry {
    atlas_config: AtlasConfig,
    slots: Vec<Option<Font>>,
}

impl FontRegistry {
    pub fn new(atlas_config: AtlasConfig) -> Self {
        Self {
            atlas_config,
            slots: Vec::new(),
        }
    }

    /// Parse `data` with fontdue and register it at `pixel_size`.
    pub fn load_font(&mut self, data: &[u8], pixel_size: f32) -> Result<FontId, TextError> {
        check_pixel_size(pixel_size)?;
        let rasterizer = FontdueRasterizer::from_bytes(data)?;
        self.load_with(Box::new(rasterizer), pixel_size)
    }

    /// Register a font backed by any rasterizer.
    pub fn load_with(
        &mut self,
        rasterizer: Box<dyn OutlineRasterizer>,
        pixel_size: f32,
    ) -> Result<FontId, TextError> {
        check_pixel_size(pixel_size)?;
        let atlas = GlyphAtlas::new(self.atlas_config)?;
        let line_metrics = rasterizer.line_metrics(pixel_size);

        let id = FontId(self.slots.len());
        self.slots.push(Some(Font {
            rasterizer,
            pixel_size,
            line_metrics,
            atlas,
            cache: GlyphCache::new(),
        }));
        log::info!("loaded {} at {}px", id, pixel_size);
        Ok(id)
    }

    /// Release a font's pages. Destroying an already destroyed font is a
    /// no-op; an id this registry never issued is an error.
    pub fn destroy_font<G: GpuBackend + ?Sized>(&mut self, gpu: &mut G, id: FontId) -> Result<(), TextError> {
        let slot = self.slots.get_mut(id.0).ok_or(TextError::UnknownFont(id))?;
        match slot.take() {
            Some(mut font) => {
                log::info!("destroying {}", id);
                font.release(gpu)
            }
            None => {
                log::debug!("{} already destroyed", id);
                Ok(())
            }
        }
    }

    /// Destroy every live font. All ids become stale.
    pub fn clear<G: GpuBackend + ?Sized>(&mut self, gpu: &mut G) -> Result<(), TextError> {
        let mut result = Ok(());
        for id in 0..self.slots.len() {
            if let Err(e) = self.destroy_font(gpu, FontId(id)) {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    pub fn get(&self, id: FontId) -> Result<&Font, TextError> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(TextError::UnknownFont(id))
    }

    pub fn get_mut(&mut self, id: FontId) -> Result<&mut Font, TextError> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(TextError::UnknownFont(id))
    }

    /// Number of fonts not yet destroyed.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new(AtlasConfig::default())
    }
}

fn check_pixel_size(pixel_size: f32) -> Result<(), TextError> {
    if pixel_size.is_finite() && pixel_size > 0.0 {
        Ok(())
    } else {
        Err(TextError::InvalidPixelSize(pixel_size))
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cubebox_render::HeadlessBackend;

    use crate::raster::RasterizedGlyph;

    struct Solid;

    impl OutlineRasterizer for Solid {
        fn rasterize(&self, _codepoint: u32, pixel_size: f32) -> Option<RasterizedGlyph> {
            let side = pixel_size as u32;
            Some(RasterizedGlyph {
                width: side,
                height: side,
                bitmap: vec![255; (side * side) as usize],
                advance: pixel_size,
                bearing_x: 0.0,
                bearing_y: -pixel_size,
            })
        }

        fn line_metrics(&self, pixel_size: f32) -> LineMetrics {
            LineMetrics {
                ascent: pixel_size * 0.8,
                descent: -pixel_size * 0.2,
                line_gap: 2.0,
            }
        }
    }

    #[test]
    fn test_ids_are_not_recycled() {
        let mut gpu = HeadlessBackend::new(64, 64);
        let mut fonts = FontRegistry::default();
        let a = fonts.load_with(Box::new(Solid), 12.0).unwrap();
        fonts.destroy_font(&mut gpu, a).unwrap();
        let b = fonts.load_with(Box::new(Solid), 12.0).unwrap();
        assert_ne!(a, b);
        assert!(matches!(fonts.get(a), Err(TextError::UnknownFont(_))));
        assert!(fonts.get(b).is_ok());
    }

    #[test]
    fn test_double_destroy_is_silent() {
        let mut gpu = HeadlessBackend::new(64, 64);
        let mut fonts = FontRegistry::default();
        let id = fonts.load_with(Box::new(Solid), 8.0).unwrap();
        fonts.get_mut(id).unwrap().glyph(&mut gpu, 'a' as u32).unwrap();
        assert_eq!(gpu.live_textures(), 1);

        fonts.destroy_font(&mut gpu, id).unwrap();
        fonts.destroy_font(&mut gpu, id).unwrap();
        assert_eq!(gpu.live_textures(), 0);
        assert!(fonts.destroy_font(&mut gpu, FontId(99)).is_err());
    }

    #[test]
    fn test_invalid_pixel_size() {
        let mut fonts = FontRegistry::default();
        for size in [0.0, -3.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                fonts.load_with(Box::new(Solid), size),
                Err(TextError::InvalidPixelSize(_))
            ));
        }
        assert_eq!(fonts.live_count(), 0);
    }

    #[test]
    fn test_invalid_font_bytes() {
        let mut fonts = FontRegistry::default();
        assert!(matches!(fonts.load_font(b"nope", 16.0), Err(TextError::InvalidFont(_))));
    }

    #[test]
    fn test_height_adds_line_gap() {
        let mut fonts = FontRegistry::default();
        let id = fonts.load_with(Box::new(Solid), 16.0).unwrap();
        assert_eq!(fonts.get(id).unwrap().height(), 18.0);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut gpu = HeadlessBackend::new(64, 64);
        let mut fonts = FontRegistry::default();
        for size in [8.0, 10.0, 12.0] {
            let id = fonts.load_with(Box::new(Solid), size).unwrap();
            fonts.get_mut(id).unwrap().glyph(&mut gpu, 'x' as u32).unwrap();
        }
        assert_eq!(gpu.live_textures(), 3);
        fonts.clear(&mut gpu).unwrap();
        assert_eq!(gpu.live_textures(), 0);
        assert_eq!(fonts.live_count(), 0);
    }
}
