//! Per-font glyph cache.
//!
//! Maps a codepoint to the record of where its bitmap lives in the atlas.
//! Entries are filled on first use and never change or leave the cache
//! until the owning font is destroyed.

use rustc_hash::{FxHashMap, FxHashSet};

use cubebox_render::{GpuBackend, PixelFormat, RenderError, TextureHandle, UvRect};

use crate::atlas::{GlyphAtlas, PageId};
use crate::error::TextError;
use crate::raster::OutlineRasterizer;

/// A glyph resident in the atlas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphRecord {
    pub codepoint: u32,
    pub page: PageId,
    pub texture: TextureHandle,
    /// Pixel rectangle on the page; `x1`/`y1` are exclusive.
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
    pub advance: f32,
    pub bearing_x: f32,
    pub bearing_y: f32,
}

impl GlyphRecord {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Texture coordinates on a square page of side `page_size`.
    pub fn uv(&self, page_size: u32) -> UvRect {
        UvRect::from_pixels(self.x0, self.y0, self.width(), self.height(), page_size, page_size)
    }
}

#[derive(Default)]
pub struct GlyphCache {
    glyphs: FxHashMap<u32, GlyphRecord>,
    /// Codepoints the rasterizer reported as absent.
    missing: FxHashSet<u32>,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn get(&self, codepoint: u32) -> Option<&GlyphRecord> {
        self.glyphs.get(&codepoint)
    }

    /// Return the record for `codepoint`, rasterizing and packing it on
    /// first use. `Ok(None)` means the font has no such glyph.
    pub fn lookup_or_load<R, G>(
        &mut self,
        rasterizer: &R,
        atlas: &mut GlyphAtlas,
        gpu: &mut G,
        pixel_size: f32,
        codepoint: u32,
    ) -> Result<Option<GlyphRecord>, TextError>
    where
        R: OutlineRasterizer + ?Sized,
        G: GpuBackend + ?Sized,
    {
        if let Some(record) = self.glyphs.get(&codepoint) {
            return Ok(Some(*record));
        }
        if self.missing.contains(&codepoint) {
            return Ok(None);
        }

        let Some(glyph) = rasterizer.rasterize(codepoint, pixel_size) else {
            log::debug!("no glyph for U+{:04X}", codepoint);
            self.missing.insert(codepoint);
            return Ok(None);
        };

        let expected = PixelFormat::Coverage.byte_len(glyph.width, glyph.height);
        if glyph.bitmap.len() != expected {
            return Err(RenderError::PixelDataLength {
                expected,
                got: glyph.bitmap.len(),
            }
            .into());
        }

        let placement = atlas.allocate(gpu, glyph.width, glyph.height)?;
        if placement.width > 0 && placement.height > 0 {
            atlas.upload_bitmap(
                gpu,
                placement.page,
                placement.x,
                placement.y,
                placement.width,
                placement.height,
                &glyph.bitmap,
            )?;
        }

        let record = GlyphRecord {
            codepoint,
            page: placement.page,
            texture: placement.texture.handle,
            x0: placement.x,
            y0: placement.y,
            x1: placement.x + placement.width,
            y1: placement.y + placement.height,
            advance: glyph.advance,
            bearing_x: glyph.bearing_x,
            bearing_y: glyph.bearing_y,
        };
        log::trace!("cached U+{:04X} on page {:?}", codepoint, record.page);
        self.glyphs.insert(codepoint, record);
        Ok(Some(record))
    }

    /// Forget every entry. Atlas pages are not touched.
    pub fn clear(&mut self) {
        self.glyphs.clear();
        self.missing.clear();
    }
}
