//! Outline rasterization.
//!
//! [`OutlineRasterizer`] is the seam between the glyph cache and whatever
//! turns font outlines into coverage bitmaps. [`FontdueRasterizer`] is the
//! default implementation.

use fontdue::{Font, FontSettings};

use crate::error::TextError;

/// A coverage bitmap plus its placement metrics, in pixels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RasterizedGlyph {
    pub width: u32,
    pub height: u32,
    /// `width × height` coverage values, row-major, top row first.
    pub bitmap: Vec<u8>,
    /// Horizontal cursor advance.
    pub advance: f32,
    /// Cursor to bitmap left edge.
    pub bearing_x: f32,
    /// Baseline to bitmap top edge, y pointing down (negative above the
    /// baseline).
    pub bearing_y: f32,
}

/// Vertical metrics of a face at a given pixel size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
}

/// Turns a codepoint into a coverage bitmap at a pixel size.
pub trait OutlineRasterizer {
    /// `None` when the face has no glyph for `codepoint`.
    fn rasterize(&self, codepoint: u32, pixel_size: f32) -> Option<RasterizedGlyph>;

    fn line_metrics(&self, pixel_size: f32) -> LineMetrics;
}

/// [`OutlineRasterizer`] backed by `fontdue`.
pub struct FontdueRasterizer {
    font: Font,
}

impl FontdueRasterizer {
    /// Parse a TrueType/OpenType font from memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self, TextError> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| TextError::InvalidFont(e.to_string()))?;
        Ok(Self { font })
    }
}

impl OutlineRasterizer for FontdueRasterizer {
    fn rasterize(&self, codepoint: u32, pixel_size: f32) -> Option<RasterizedGlyph> {
        let ch = char::from_u32(codepoint)?;
        if self.font.lookup_glyph_index(ch) == 0 {
            return None;
        }
        let (metrics, bitmap) = self.font.rasterize(ch, pixel_size);
        Some(RasterizedGlyph {
            width: metrics.width as u32,
            height: metrics.height as u32,
            bitmap,
            advance: metrics.advance_width,
            bearing_x: metrics.xmin as f32,
            // fontdue measures ymin upward from the baseline to the bitmap bottom.
            bearing_y: -(metrics.ymin as f32 + metrics.height as f32),
        })
    }

    fn line_metrics(&self, pixel_size: f32) -> LineMetrics {
        self.font
            .horizontal_line_metrics(pixel_size)
            .map(|m| LineMetrics {
                ascent: m.ascent,
                descent: m.descent,
                line_gap: m.line_gap,
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_font_rejected() {
        let err = FontdueRasterizer::from_bytes(b"definitely not a font").err();
        assert!(matches!(err, Some(TextError::InvalidFont(_))));
    }

    #[test]
    fn test_empty_font_rejected() {
        assert!(FontdueRasterizer::from_bytes(&[]).is_err());
    }
}
