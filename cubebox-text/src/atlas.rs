//! Glyph atlas — fixed-size coverage pages with skyline packing.
//!
//! Each page tracks a "skyline": the top edge of everything placed so
//! far, stored as a list of horizontal segments. A new rectangle goes at
//! the position whose resting height is lowest (leftmost on ties), and
//! the skyline is raised over its footprint.
//!
//! Pages are append-only. When the current page cannot fit a glyph a new
//! page is created and becomes current; earlier pages are never revisited,
//! merged or shrunk. Every page keeps a CPU shadow of its pixels next to
//! the GPU texture.

use cubebox_render::{check_region, GpuBackend, PixelFormat, Texture};

use crate::error::TextError;

/// Atlas tuning knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Side length of every (square) page in pixels.
    pub page_size: u32,
    /// Empty pixels kept to the right of and below every glyph.
    pub padding: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            page_size: 512,
            padding: 1,
        }
    }
}

// ===================================================================
// Skyline packer
// ===================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    x: u32,
    y: u32,
    width: u32,
}

/// Skyline bin packer over a square region.
#[derive(Clone, Debug)]
pub struct Skyline {
    size: u32,
    segments: Vec<Segment>,
}

impl Skyline {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            segments: vec![Segment {
                x: 0,
                y: 0,
                width: size,
            }],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Reserve a `width × height` rectangle, returning its top-left
    /// corner, or `None` if the region has no room left for it. An empty
    /// rectangle takes no space: it gets the origin and the skyline is
    /// left as it was.
    pub fn pack(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width > self.size || height > self.size {
            return None;
        }
        if width == 0 || height == 0 {
            return Some((0, 0));
        }

        let mut best: Option<(usize, u32)> = None;
        for i in 0..self.segments.len() {
            if let Some(y) = self.fit(i, width, height) {
                if best.map_or(true, |(_, best_y)| y < best_y) {
                    best = Some((i, y));
                }
            }
        }

        let (index, y) = best?;
        let x = self.segments[index].x;
        self.raise(index, x, y + height, width);
        Some((x, y))
    }

    /// Resting height for a rectangle whose left edge sits on segment `i`.
    fn fit(&self, i: usize, width: u32, height: u32) -> Option<u32> {
        let x = self.segments[i].x;
        if x + width > self.size {
            return None;
        }
        let mut y = 0;
        let mut covered = 0;
        for seg in &self.segments[i..] {
            if covered >= width {
                break;
            }
            y = y.max(seg.y);
            covered += seg.width;
        }
        if y + height > self.size {
            return None;
        }
        Some(y)
    }

    fn raise(&mut self, index: usize, x: u32, top: u32, width: u32) {
        self.segments.insert(index, Segment { x, y: top, width });

        // Trim segments now hidden under the new one.
        let end = x + width;
        let next = index + 1;
        while next < self.segments.len() {
            let seg = self.segments[next];
            if seg.x >= end {
                break;
            }
            let overlap = end - seg.x;
            if overlap >= seg.width {
                self.segments.remove(next);
            } else {
                self.segments[next].x += overlap;
                self.segments[next].width -= overlap;
                break;
            }
        }

        // Merge neighbours at equal height.
        let mut i = 0;
        while i + 1 < self.segments.len() {
            if self.segments[i].y == self.segments[i + 1].y {
                self.segments[i].width += self.segments[i + 1].width;
                self.segments.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }
}

// ===================================================================
// Pages
// ===================================================================

/// Index of a page within its [`GlyphAtlas`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub usize);

/// One square coverage texture and its packer state.
pub struct AtlasPage {
    texture: Texture,
    packer: Skyline,
    /// CPU copy of the page, one byte per pixel.
    pixels: Vec<u8>,
}

impl AtlasPage {
    pub fn texture(&self) -> Texture {
        self.texture
    }

    pub fn size(&self) -> u32 {
        self.packer.size()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Where a glyph bitmap landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub page: PageId,
    pub texture: Texture,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

// ===================================================================
// Atlas
// ===================================================================

/// The ordered page list of one font.
pub struct GlyphAtlas {
    config: AtlasConfig,
    pages: Vec<AtlasPage>,
}

impl GlyphAtlas {
    pub fn new(config: AtlasConfig) -> Result<Self, TextError> {
        if config.page_size == 0 {
            return Err(TextError::InvalidPageSize);
        }
        Ok(Self {
            config,
            pages: Vec::new(),
        })
    }

    pub fn config(&self) -> AtlasConfig {
        self.config
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, id: PageId) -> Option<&AtlasPage> {
        self.pages.get(id.0)
    }

    pub fn pages(&self) -> &[AtlasPage] {
        &self.pages
    }

    /// The page new glyphs go to, if any page exists.
    pub fn current_page(&self) -> Option<PageId> {
        self.pages.len().checked_sub(1).map(PageId)
    }

    /// Append a zeroed page and make it current.
    pub fn create_page<G: GpuBackend + ?Sized>(&mut self, gpu: &mut G) -> Result<PageId, TextError> {
        let size = self.config.page_size;
        let texture = gpu.create_texture(size, size, PixelFormat::Coverage, None)?;
        self.pages.push(AtlasPage {
            texture,
            packer: Skyline::new(size),
            pixels: vec![0u8; size as usize * size as usize],
        });
        log::debug!("atlas page {} created ({}×{})", self.pages.len() - 1, size, size);
        Ok(PageId(self.pages.len() - 1))
    }

    /// Reserve space for a `width × height` bitmap on `page`.
    pub fn pack_glyph(&mut self, page: PageId, width: u32, height: u32) -> Option<(u32, u32)> {
        let size = self.config.page_size;
        let padded_w = width.saturating_add(self.config.padding).min(size);
        let padded_h = height.saturating_add(self.config.padding).min(size);
        self.pages.get_mut(page.0)?.packer.pack(padded_w, padded_h)
    }

    /// Copy a tightly packed coverage bitmap into `page` at `(x, y)`,
    /// both on the GPU and in the CPU shadow.
    #[allow(clippy::too_many_arguments)]
    pub fn upload_bitmap<G: GpuBackend + ?Sized>(
        &mut self,
        gpu: &mut G,
        page: PageId,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        bitmap: &[u8],
    ) -> Result<(), TextError> {
        let side = self.config.page_size;
        let entry = self
            .pages
            .get_mut(page.0)
            .ok_or(TextError::UnknownPage(page))?;

        // Checked against the shadow's own shape, not the backend's.
        let shadow = Texture {
            handle: entry.texture.handle,
            width: side,
            height: side,
            format: PixelFormat::Coverage,
        };
        check_region(&shadow, x, y, width, height, bitmap)?;
        gpu.upload_region(entry.texture.handle, x, y, width, height, bitmap)?;

        let size = side as usize;
        let w = width as usize;
        for row in 0..height as usize {
            let dst = (y as usize + row) * size + x as usize;
            entry.pixels[dst..dst + w].copy_from_slice(&bitmap[row * w..(row + 1) * w]);
        }
        Ok(())
    }

    /// Find room for a glyph, creating a new page when the current one
    /// is full.
    pub fn allocate<G: GpuBackend + ?Sized>(
        &mut self,
        gpu: &mut G,
        width: u32,
        height: u32,
    ) -> Result<Placement, TextError> {
        let size = self.config.page_size;
        if width > size || height > size {
            return Err(TextError::GlyphTooLarge {
                width,
                height,
                page_size: size,
            });
        }

        let current = match self.current_page() {
            Some(page) => page,
            None => self.create_page(gpu)?,
        };

        if width == 0 || height == 0 {
            return Ok(self.placement(current, 0, 0, 0, 0));
        }

        if let Some((x, y)) = self.pack_glyph(current, width, height) {
            return Ok(self.placement(current, x, y, width, height));
        }

        let fresh = self.create_page(gpu)?;
        match self.pack_glyph(fresh, width, height) {
            Some((x, y)) => Ok(self.placement(fresh, x, y, width, height)),
            None => Err(TextError::GlyphTooLarge {
                width,
                height,
                page_size: size,
            }),
        }
    }

    /// Release every page texture. The atlas is empty afterwards.
    pub fn destroy<G: GpuBackend + ?Sized>(&mut self, gpu: &mut G) -> Result<(), TextError> {
        let mut result = Ok(());
        for page in self.pages.drain(..) {
            if let Err(e) = gpu.destroy_texture(page.texture.handle) {
                log::warn!("failed to release atlas page {:?}: {}", page.texture.handle, e);
                if result.is_ok() {
                    result = Err(e.into());
                }
            }
        }
        result
    }

    fn placement(&self, page: PageId, x: u32, y: u32, width: u32, height: u32) -> Placement {
        Placement {
            page,
            texture: self.pages[page.0].texture,
            x,
            y,
            width,
            height,
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
