//! Text layout: decode UTF-8, resolve glyphs, position quads.
//!
//! Layout is a single horizontal run: each glyph's quad sits at
//! `floor(cursor + bearing)` and the cursor moves right by the glyph's
//! advance. `y` is the baseline. Codepoints the font lacks and malformed
//! bytes are skipped without affecting the cursor.

use cubebox_render::{GpuBackend, Quad, QuadBatch, TextureHandle, UvRect};

use crate::error::TextError;
use crate::fonts::{FontId, FontRegistry};
use crate::utf8;

/// One glyph placed on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionedGlyph {
    pub codepoint: u32,
    pub texture: TextureHandle,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub uv: UvRect,
}

impl PositionedGlyph {
    pub fn quad(&self, color: [f32; 4]) -> Quad {
        Quad::axis_aligned(self.x, self.y, self.width, self.height, self.uv, color)
    }

    fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// Result of laying out a run of text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayout {
    pub glyphs: Vec<PositionedGlyph>,
    /// Cursor x after the last glyph.
    pub cursor: f32,
}

/// Position every glyph of `text` starting at `(x, y)`.
pub fn layout_text<G: GpuBackend + ?Sized>(
    fonts: &mut FontRegistry,
    gpu: &mut G,
    font: FontId,
    text: &[u8],
    x: f32,
    y: f32,
) -> Result<TextLayout, TextError> {
    let font = fonts.get_mut(font)?;
    let page_size = font.atlas().config().page_size;

    let mut cursor = x;
    let mut glyphs = Vec::with_capacity(text.len());
    for codepoint in utf8::decode(text) {
        let Some(glyph) = font.glyph(gpu, codepoint)? else {
            continue;
        };
        glyphs.push(PositionedGlyph {
            codepoint,
            texture: glyph.texture,
            x: (cursor + glyph.bearing_x).floor(),
            y: (y + glyph.bearing_y).floor(),
            width: glyph.width() as f32,
            height: glyph.height() as f32,
            uv: glyph.uv(page_size),
        });
        cursor += glyph.advance;
    }

    Ok(TextLayout { glyphs, cursor })
}

/// Lay out `text` and submit its quads to `batch`, which must be inside
/// a pass. Returns the final cursor x.
#[allow(clippy::too_many_arguments)]
pub fn draw_text<G: GpuBackend + ?Sized>(
    fonts: &mut FontRegistry,
    gpu: &mut G,
    batch: &mut QuadBatch,
    font: FontId,
    text: &[u8],
    x: f32,
    y: f32,
    color: [f32; 4],
) -> Result<f32, TextError> {
    let layout = layout_text(fonts, gpu, font, text, x, y)?;
    for glyph in layout.glyphs.iter().filter(|g| !g.is_empty()) {
        batch.submit(gpu, glyph.texture, &glyph.quad(color))?;
    }
    Ok(layout.cursor)
}

/// Horizontal extent of `text` laid out from zero.
pub fn text_width<G: GpuBackend + ?Sized>(
    fonts: &mut FontRegistry,
    gpu: &mut G,
    font: FontId,
    text: &[u8],
) -> Result<f32, TextError> {
    Ok(layout_text(fonts, gpu, font, text, 0.0, 0.0)?.cursor)
}

/// Line height of `font`: pixel size plus line gap.
pub fn font_height(fonts: &FontRegistry, font: FontId) -> Result<f32, TextError> {
    Ok(fonts.get(font)?.height())
}

// ===================================================================
// Tests
// ===================================================================
